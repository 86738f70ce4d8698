//! Resume persistence: one row per user, plus an S3 Markdown snapshot per save.

use aws_sdk_s3::primitives::ByteStream;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::resume::markdown::normalize_content;

pub fn snapshot_key(user_id: Uuid, saved_at: DateTime<Utc>) -> String {
    format!("resumes/{}/{}.md", user_id, saved_at.format("%Y%m%dT%H%M%S%.3fZ"))
}

pub async fn get_resume(pool: &PgPool, user_id: Uuid) -> Result<Option<ResumeRow>, AppError> {
    Ok(
        sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?,
    )
}

/// Normalises `content`, uploads a snapshot, then upserts the user's resume row.
pub async fn save_resume(
    pool: &PgPool,
    s3: &aws_sdk_s3::Client,
    s3_bucket: &str,
    user_id: Uuid,
    content: &str,
) -> Result<ResumeRow, AppError> {
    let content = normalize_content(content);
    if content.is_empty() {
        return Err(AppError::Validation("content cannot be empty".to_string()));
    }

    let s3_key = snapshot_key(user_id, Utc::now());
    s3.put_object()
        .bucket(s3_bucket)
        .key(&s3_key)
        .body(ByteStream::from(content.clone().into_bytes()))
        .content_type("text/markdown")
        .send()
        .await
        .map_err(|e| AppError::S3(format!("Resume snapshot upload failed: {e}")))?;

    info!("Uploaded resume snapshot to s3://{}/{}", s3_bucket, s3_key);

    let row = sqlx::query_as::<_, ResumeRow>(
        r#"
        INSERT INTO resumes (id, user_id, content, s3_key)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (user_id) DO UPDATE
            SET content = EXCLUDED.content,
                s3_key = EXCLUDED.s3_key,
                updated_at = now()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&content)
    .bind(&s3_key)
    .fetch_one(pool)
    .await?;

    Ok(row)
}
