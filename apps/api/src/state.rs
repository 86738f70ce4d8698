use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::auth::IdentityProvider;
use crate::config::Config;
use crate::insights::service::InsightService;
use crate::interview::store::AssessmentStore;
use crate::llm_client::TextGenerator;
use crate::users::store::UserStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    /// The only way handlers reach the model.
    pub llm: Arc<dyn TextGenerator>,
    pub config: Config,
    /// Resolves the caller from request headers.
    pub identity: Arc<dyn IdentityProvider>,
    pub users: Arc<dyn UserStore>,
    pub insights: Arc<InsightService>,
    pub assessments: Arc<dyn AssessmentStore>,
}
