use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    /// Header carrying the caller id forwarded by the identity gateway.
    pub auth_user_header: String,
    /// Days between an insight's creation and its `next_update` marker.
    pub insight_refresh_days: i64,
    /// Total attempts per LLM call. 1 disables transport retries.
    pub llm_max_attempts: u32,
    /// Expiry of the per-industry generation lock in Redis.
    pub insight_lock_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: parse_or_default("PORT", std::env::var("PORT").ok(), 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            auth_user_header: std::env::var("AUTH_USER_HEADER")
                .unwrap_or_else(|_| "x-user-id".to_string()),
            insight_refresh_days: parse_or_default(
                "INSIGHT_REFRESH_DAYS",
                std::env::var("INSIGHT_REFRESH_DAYS").ok(),
                7,
            )?,
            llm_max_attempts: parse_or_default(
                "LLM_MAX_ATTEMPTS",
                std::env::var("LLM_MAX_ATTEMPTS").ok(),
                1,
            )?,
            insight_lock_ttl_secs: parse_or_default(
                "INSIGHT_LOCK_TTL_SECS",
                std::env::var("INSIGHT_LOCK_TTL_SECS").ok(),
                120,
            )?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Parses an optional variable, falling back to `default` when it is unset.
fn parse_or_default<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid {}", std::any::type_name::<T>())),
        None => Ok(default),
    }
}
