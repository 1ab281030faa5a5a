//! Profile endpoint.

use axum::extract::State;

use super::{success, ApiResult};
use crate::models::Profile;
use crate::AppState;

/// GET /api/profile - Progress statistics of the session user.
pub async fn get_profile(State(state): State<AppState>) -> ApiResult<Profile> {
    let user = state.session.require().await?;
    success(state.progress.profile(user).await?)
}
