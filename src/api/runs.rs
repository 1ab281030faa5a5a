//! Activity run endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::activity::{Action, RunView};
use crate::AppState;

/// GET /api/runs/:id - Snapshot of a run.
pub async fn get_run(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<RunView> {
    let run = state.runs.get(&id).await?;
    success(run.view().await)
}

/// POST /api/runs/:id/actions - Apply learner input to a run.
pub async fn run_action(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<Action>, JsonRejection>,
) -> ApiResult<RunView> {
    let Json(action) = payload?;

    success(state.runs.act(&id, action).await?)
}

/// DELETE /api/runs/:id - Abandon a run.
pub async fn abandon_run(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    state.runs.abandon(&id).await?;
    success(())
}
