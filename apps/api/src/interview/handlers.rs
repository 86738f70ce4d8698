//! Axum route handlers for the Interview API.

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::interview::assessment::{assessment_stats, save_assessment, SaveAssessmentRequest};
use crate::interview::models::{AssessmentStats, QuizQuestion};
use crate::interview::quiz::generate_quiz;
use crate::models::assessment::AssessmentRow;
use crate::state::AppState;
use crate::users::handlers::current_user;

#[derive(Debug, Serialize)]
pub struct QuizResponse {
    pub questions: Vec<QuizQuestion>,
}

/// POST /api/v1/interview/quiz
///
/// Generates a fresh multiple-choice quiz for the caller's industry.
pub async fn handle_generate_quiz(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<QuizResponse>, AppError> {
    let user = current_user(&state, &headers).await?;
    let industry = user
        .onboarded_industry()
        .ok_or(AppError::OnboardingRequired)?;

    let questions = generate_quiz(state.llm.as_ref(), industry, &user.skills).await?;
    Ok(Json(QuizResponse { questions }))
}

/// POST /api/v1/interview/assessments
pub async fn handle_save_assessment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SaveAssessmentRequest>,
) -> Result<Json<AssessmentRow>, AppError> {
    let user = current_user(&state, &headers).await?;
    let industry = user
        .onboarded_industry()
        .ok_or(AppError::OnboardingRequired)?;

    let row = save_assessment(
        state.assessments.as_ref(),
        state.llm.as_ref(),
        &user,
        industry,
        req,
    )
    .await?;
    Ok(Json(row))
}

/// GET /api/v1/interview/assessments
pub async fn handle_list_assessments(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<AssessmentRow>>, AppError> {
    let user = current_user(&state, &headers).await?;
    Ok(Json(state.assessments.list_assessments(user.id).await?))
}

/// GET /api/v1/interview/stats
pub async fn handle_assessment_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AssessmentStats>, AppError> {
    let user = current_user(&state, &headers).await?;
    let assessments = state.assessments.list_assessments(user.id).await?;
    Ok(Json(assessment_stats(&assessments)))
}
