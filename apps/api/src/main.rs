mod auth;
mod config;
mod db;
mod errors;
mod insights;
mod interview;
mod llm_client;
mod models;
mod resume;
mod routes;
mod state;
mod users;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;
use std::time::Duration;

use crate::auth::HeaderIdentityProvider;
use crate::config::Config;
use crate::db::{create_pool, PgStore};
use crate::insights::generator::InsightGenerator;
use crate::insights::service::InsightService;
use crate::insights::single_flight::RedisFlightGuard;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting coach API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs migrations)
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgStore::new(db.clone()));

    // Redis backs the per-industry generation lock
    let redis = redis::Client::open(config.redis_url.clone())?;
    let guard = Arc::new(RedisFlightGuard::new(redis, config.insight_lock_ttl_secs));
    info!("Redis client initialized");

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized");

    // Initialize LLM client
    let llm = Arc::new(
        LlmClient::new(config.anthropic_api_key.clone())?.with_max_attempts(config.llm_max_attempts),
    );
    info!(
        "LLM client initialized (model: {}, attempts: {})",
        llm_client::MODEL,
        config.llm_max_attempts
    );

    let identity = Arc::new(HeaderIdentityProvider::new(&config.auth_user_header)?);
    info!("Caller identity read from '{}' header", config.auth_user_header);

    let insights = InsightService::new(
        store.clone(),
        InsightGenerator::new(llm.clone()),
        guard,
        config.insight_refresh_days,
        Duration::from_secs(config.insight_lock_ttl_secs),
    );

    // Build app state
    let state = AppState {
        db,
        s3,
        llm,
        config: config.clone(),
        identity,
        assessments: store.clone(),
        users: store,
        insights: Arc::new(insights),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the web frontend

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "coach-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
