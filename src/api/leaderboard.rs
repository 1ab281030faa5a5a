//! Leaderboard endpoint.

use axum::extract::State;

use super::{success, ApiResult};
use crate::leaderboard;
use crate::models::LeaderboardRow;
use crate::AppState;

/// GET /api/leaderboard - Reconcile and return the ranked table.
pub async fn get_leaderboard(State(state): State<AppState>) -> ApiResult<Vec<LeaderboardRow>> {
    let table = state.leaderboard.refresh().await?;
    let current = state.session.current().await?;

    success(leaderboard::rows(table, current.as_ref().map(|u| u.id.as_str())))
}
