use axum::{extract::State, http::HeaderMap, Json};

use crate::errors::AppError;
use crate::models::user::User;
use crate::state::AppState;
use crate::users::onboarding::{onboarding_status, update_profile, OnboardingStatus, ProfileRequest};
use crate::users::store::SyncUser;

/// Resolves the caller to a stored user: 401 without identity, 404 if unknown.
pub(crate) async fn current_user(state: &AppState, headers: &HeaderMap) -> Result<User, AppError> {
    let caller = state
        .identity
        .current_caller(headers)
        .await
        .ok_or(AppError::Unauthorized)?;
    state
        .users
        .find_user(caller.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// POST /api/v1/users/sync
pub async fn handle_sync_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SyncUser>,
) -> Result<Json<User>, AppError> {
    let caller = state
        .identity
        .current_caller(&headers)
        .await
        .ok_or(AppError::Unauthorized)?;
    if req.email.trim().is_empty() {
        return Err(AppError::Validation("email cannot be empty".to_string()));
    }
    let user = state.users.upsert_user(caller.as_str(), &req).await?;
    Ok(Json(user))
}

/// GET /api/v1/users/onboarding
pub async fn handle_onboarding_status(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<OnboardingStatus>, AppError> {
    let caller = state.identity.current_caller(&headers).await;
    let status = onboarding_status(state.users.as_ref(), caller.as_ref()).await?;
    Ok(Json(status))
}

/// PUT /api/v1/users/profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<User>, AppError> {
    let caller = state.identity.current_caller(&headers).await;
    let user = update_profile(state.users.as_ref(), &state.insights, caller.as_ref(), req).await?;
    Ok(Json(user))
}
