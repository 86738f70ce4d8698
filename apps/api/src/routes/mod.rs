pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::insights::handlers as insights;
use crate::interview::handlers as interview;
use crate::resume::handlers as resume;
use crate::state::AppState;
use crate::users::handlers as users;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Accounts
        .route("/api/v1/users/sync", post(users::handle_sync_user))
        .route(
            "/api/v1/users/onboarding",
            get(users::handle_onboarding_status),
        )
        .route("/api/v1/users/profile", put(users::handle_update_profile))
        // Industry insights
        .route("/api/v1/insights", get(insights::handle_get_insights))
        // Interview preparation
        .route("/api/v1/interview/quiz", post(interview::handle_generate_quiz))
        .route(
            "/api/v1/interview/assessments",
            get(interview::handle_list_assessments).post(interview::handle_save_assessment),
        )
        .route("/api/v1/interview/stats", get(interview::handle_assessment_stats))
        // Resume builder
        .route(
            "/api/v1/resume",
            get(resume::handle_get_resume).put(resume::handle_save_resume),
        )
        .route("/api/v1/resume/preview", post(resume::handle_preview_resume))
        .route("/api/v1/resume/improve", post(resume::handle_improve))
        .with_state(state)
}
