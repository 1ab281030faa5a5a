//! Signup, login and session endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use super::{success, ApiResult};
use crate::models::{LoginRequest, SessionUser, SignupRequest};
use crate::validation;
use crate::AppState;

/// POST /api/auth/signup - Register a new user.
///
/// Signing up does not log the user in. A taken email is reported together
/// with any other failing field.
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<SessionUser> {
    let Json(request) = payload?;
    let taken = state.users.email_taken(&request.email).await?;
    validation::validate_signup(&request, taken)?;

    let user = state
        .users
        .register(&request.name, &request.email, &request.password)
        .await?;

    success(SessionUser::from(&user))
}

/// POST /api/auth/login - Check credentials and start a session.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<SessionUser> {
    let Json(request) = payload?;
    validation::validate_login(&request)?;

    let user = state
        .users
        .authenticate(&request.email, &request.password)
        .await?;

    success(state.session.login(&user).await?)
}

/// POST /api/auth/logout - End the current session.
pub async fn logout(State(state): State<AppState>) -> ApiResult<()> {
    state.session.logout().await?;
    success(())
}

/// GET /api/auth/session - The current session, or null.
pub async fn current_session(State(state): State<AppState>) -> ApiResult<Option<SessionUser>> {
    success(state.session.current().await?)
}
