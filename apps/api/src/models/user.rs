use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    /// Id issued by the identity provider.
    pub external_id: String,
    pub email: String,
    pub name: Option<String>,
    pub image_url: Option<String>,
    /// Set during onboarding. Links the user to an industry insight.
    pub industry: Option<String>,
    pub experience: Option<i32>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The user's industry, if onboarding recorded a non-blank one.
    pub fn onboarded_industry(&self) -> Option<&str> {
        self.industry
            .as_deref()
            .map(str::trim)
            .filter(|industry| !industry.is_empty())
    }
}
