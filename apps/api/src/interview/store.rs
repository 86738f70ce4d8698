//! Persistence for interview assessments.

use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use crate::db::PgStore;
use crate::errors::AppError;
use crate::interview::models::NewAssessment;
use crate::models::assessment::AssessmentRow;

#[async_trait]
pub trait AssessmentStore: Send + Sync {
    async fn create_assessment(&self, new: NewAssessment) -> Result<AssessmentRow, AppError>;

    /// All assessments of one user, oldest first.
    async fn list_assessments(&self, user_id: Uuid) -> Result<Vec<AssessmentRow>, AppError>;
}

#[async_trait]
impl AssessmentStore for PgStore {
    async fn create_assessment(&self, new: NewAssessment) -> Result<AssessmentRow, AppError> {
        Ok(sqlx::query_as::<_, AssessmentRow>(
            r#"
            INSERT INTO assessments
                (id, user_id, quiz_score, questions, category, improvement_tip)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(new.quiz_score)
        .bind(Json(&new.questions))
        .bind(&new.category)
        .bind(&new.improvement_tip)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_assessments(&self, user_id: Uuid) -> Result<Vec<AssessmentRow>, AppError> {
        Ok(sqlx::query_as::<_, AssessmentRow>(
            "SELECT * FROM assessments WHERE user_id = $1 ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }
}
