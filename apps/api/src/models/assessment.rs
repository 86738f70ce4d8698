use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::interview::models::QuestionResult;

/// A finished mock-interview quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Percentage of correct answers, 0 to 100.
    pub quiz_score: f64,
    pub questions: Json<Vec<QuestionResult>>,
    pub category: String,
    pub improvement_tip: Option<String>,
    pub created_at: DateTime<Utc>,
}
