//! Axum route handlers for the Resume API.

use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::resume::improve::{improve_entry, ImproveRequest, ImproveResponse};
use crate::resume::markdown::{render_resume, validate_entry, ResumeForm};
use crate::resume::storage::{get_resume, save_resume};
use crate::state::AppState;
use crate::users::handlers::current_user;

#[derive(Debug, Deserialize)]
pub struct SaveResumeRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub content: String,
}

/// GET /api/v1/resume
pub async fn handle_get_resume(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Option<ResumeRow>>, AppError> {
    let user = current_user(&state, &headers).await?;
    Ok(Json(get_resume(&state.db, user.id).await?))
}

/// PUT /api/v1/resume
pub async fn handle_save_resume(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SaveResumeRequest>,
) -> Result<Json<ResumeRow>, AppError> {
    let user = current_user(&state, &headers).await?;
    let row = save_resume(
        &state.db,
        &state.s3,
        &state.config.s3_bucket,
        user.id,
        &req.content,
    )
    .await?;
    Ok(Json(row))
}

/// POST /api/v1/resume/preview
///
/// Renders the builder form to Markdown without saving it.
pub async fn handle_preview_resume(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<ResumeForm>,
) -> Result<Json<PreviewResponse>, AppError> {
    let user = current_user(&state, &headers).await?;

    for entry in form
        .experience
        .iter()
        .chain(&form.education)
        .chain(&form.projects)
    {
        validate_entry(entry)?;
    }

    let full_name = user.name.as_deref().unwrap_or_default();
    Ok(Json(PreviewResponse {
        content: render_resume(&form, full_name),
    }))
}

/// POST /api/v1/resume/improve
pub async fn handle_improve(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ImproveRequest>,
) -> Result<Json<ImproveResponse>, AppError> {
    let user = current_user(&state, &headers).await?;
    let industry = user
        .onboarded_industry()
        .ok_or(AppError::OnboardingRequired)?;

    let improved = improve_entry(state.llm.as_ref(), industry, &req).await?;
    Ok(Json(ImproveResponse { improved }))
}
