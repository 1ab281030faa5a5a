//! Catalog endpoints.

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::activity::RunView;
use crate::catalog;
use crate::errors::AppError;
use crate::models::{LearningModule, Level};
use crate::AppState;

/// Query parameters for the module listing.
#[derive(Debug, Deserialize)]
pub struct ModuleQuery {
    pub level: Option<String>,
}

/// GET /api/modules - List modules, optionally filtered by level.
///
/// `level=all` or no level lists every module.
pub async fn list_modules(Query(query): Query<ModuleQuery>) -> ApiResult<Vec<LearningModule>> {
    let level = match query.level.as_deref() {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(Level::parse(raw).ok_or_else(|| {
            AppError::BadRequest(format!("Unknown level '{}'", raw))
        })?),
    };

    tracing::debug!(level = level.map_or("all", |l| l.as_str()), "Listing modules");
    success(catalog::modules(level))
}

/// GET /api/modules/:id - Get a single module.
pub async fn get_module(Path(id): Path<String>) -> ApiResult<LearningModule> {
    match catalog::module_by_id(&id) {
        Some(module) => success(module.clone()),
        None => Err(AppError::NotFound(format!("Module {} not found", id))),
    }
}

/// POST /api/modules/:id/runs - Start an activity run of a module.
///
/// Runs started without a session, or by a session whose user no longer
/// exists, can be played but are not recorded.
pub async fn start_run(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<RunView> {
    let module = catalog::module_by_id(&id)
        .ok_or_else(|| AppError::NotFound(format!("Module {} not found", id)))?;
    let user_id = match state.session.current().await? {
        Some(session) => state.users.find_by_id(&session.id).await?.map(|u| u.id),
        None => None,
    };

    success(state.runs.start(user_id, module).await?)
}
