use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::insights::models::SalaryRange;

/// A persisted industry insight. One row per distinct industry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct IndustryInsightRow {
    pub id: Uuid,
    pub industry: String,
    pub salary_ranges: Json<Vec<SalaryRange>>,
    pub growth_rate: f64,
    pub demand_level: String,
    pub top_skills: Vec<String>,
    pub market_outlook: String,
    pub key_trends: Vec<String>,
    pub recommended_skills: Vec<String>,
    pub last_updated: DateTime<Utc>,
    /// Refresh marker. Stored but not consulted when serving insights.
    pub next_update: DateTime<Utc>,
}
