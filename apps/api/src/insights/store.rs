//! Persistence for industry insights.

use async_trait::async_trait;
use sqlx::types::Json;
use uuid::Uuid;

use crate::db::PgStore;
use crate::errors::AppError;
use crate::insights::models::NewIndustryInsight;
use crate::models::insight::IndustryInsightRow;
use crate::models::user::User;

/// A user together with the insight linked through their industry.
#[derive(Debug, Clone)]
pub struct Account {
    pub user: User,
    pub insight: Option<IndustryInsightRow>,
}

#[async_trait]
pub trait InsightStore: Send + Sync {
    /// Looks up a user by identity-provider id, including any linked insight.
    async fn find_account(&self, external_id: &str) -> Result<Option<Account>, AppError>;

    async fn find_insight(&self, industry: &str) -> Result<Option<IndustryInsightRow>, AppError>;

    /// Inserts a new insight unless one already exists for the industry.
    /// Returns the stored row either way; the first writer wins.
    async fn create_insight(
        &self,
        new: NewIndustryInsight,
    ) -> Result<IndustryInsightRow, AppError>;
}

#[async_trait]
impl InsightStore for PgStore {
    async fn find_account(&self, external_id: &str) -> Result<Option<Account>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE external_id = $1")
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(user) = user else {
            return Ok(None);
        };

        let insight = match user.onboarded_industry() {
            Some(industry) => self.find_insight(industry).await?,
            None => None,
        };

        Ok(Some(Account { user, insight }))
    }

    async fn find_insight(&self, industry: &str) -> Result<Option<IndustryInsightRow>, AppError> {
        Ok(sqlx::query_as::<_, IndustryInsightRow>(
            "SELECT * FROM industry_insights WHERE industry = $1",
        )
        .bind(industry)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn create_insight(
        &self,
        new: NewIndustryInsight,
    ) -> Result<IndustryInsightRow, AppError> {
        let NewIndustryInsight {
            industry,
            insights,
            next_update,
        } = new;

        let inserted = sqlx::query_as::<_, IndustryInsightRow>(
            r#"
            INSERT INTO industry_insights
                (id, industry, salary_ranges, growth_rate, demand_level, top_skills,
                 market_outlook, key_trends, recommended_skills, next_update)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (industry) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&industry)
        .bind(Json(&insights.salary_ranges))
        .bind(insights.growth_rate)
        .bind(insights.demand_level.as_str())
        .bind(&insights.top_skills)
        .bind(insights.market_outlook.as_str())
        .bind(&insights.key_trends)
        .bind(&insights.recommended_skills)
        .bind(next_update)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            return Ok(row);
        }

        // Lost the race: another request stored this industry first.
        self.find_insight(&industry).await?.ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "Insight for {industry} vanished after conflicting insert"
            ))
        })
    }
}
