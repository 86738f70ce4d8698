//! Persistence for user accounts.

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::PgStore;
use crate::errors::AppError;
use crate::models::user::User;

/// Identity details copied from the identity provider on sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncUser {
    pub email: String,
    pub name: Option<String>,
    pub image_url: Option<String>,
}

/// Onboarding answers, already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub industry: String,
    pub experience: Option<i32>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, external_id: &str) -> Result<Option<User>, AppError>;

    /// Creates the user on first sign-in, otherwise refreshes email/name/image.
    async fn upsert_user(&self, external_id: &str, sync: &SyncUser) -> Result<User, AppError>;

    /// Returns `None` if no user has `external_id`.
    async fn update_profile(
        &self,
        external_id: &str,
        profile: &ProfileUpdate,
    ) -> Result<Option<User>, AppError>;
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user(&self, external_id: &str) -> Result<Option<User>, AppError> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE external_id = $1")
                .bind(external_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn upsert_user(&self, external_id: &str, sync: &SyncUser) -> Result<User, AppError> {
        Ok(sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, external_id, email, name, image_url)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (external_id) DO UPDATE
                SET email = EXCLUDED.email,
                    name = EXCLUDED.name,
                    image_url = EXCLUDED.image_url,
                    updated_at = now()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(external_id)
        .bind(&sync.email)
        .bind(&sync.name)
        .bind(&sync.image_url)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn update_profile(
        &self,
        external_id: &str,
        profile: &ProfileUpdate,
    ) -> Result<Option<User>, AppError> {
        Ok(sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET industry = $2, experience = $3, bio = $4, skills = $5, updated_at = now()
             WHERE external_id = $1
            RETURNING *
            "#,
        )
        .bind(external_id)
        .bind(&profile.industry)
        .bind(profile.experience)
        .bind(&profile.bio)
        .bind(&profile.skills)
        .fetch_optional(&self.pool)
        .await?)
    }
}
