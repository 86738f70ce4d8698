//! Axum route handlers for the Insights API.

use axum::{extract::State, http::HeaderMap, Json};

use crate::errors::AppError;
use crate::models::insight::IndustryInsightRow;
use crate::state::AppState;

/// GET /api/v1/insights
///
/// Returns the caller's industry insight, generating it on first access.
pub async fn handle_get_insights(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<IndustryInsightRow>, AppError> {
    let caller = state.identity.current_caller(&headers).await;
    let insight = state.insights.get_industry_insights(caller.as_ref()).await?;
    Ok(Json(insight))
}
