//! Insight Store Accessor — serves the caller's industry insight, creating it
//! on first access.
//!
//! Steps:
//! 1. No caller → 401 (no store lookup)
//! 2. find_account() → 404 if the user is unknown
//! 3. Linked insight present → returned as-is (no staleness check)
//! 4. Otherwise → generate under a per-industry single-flight guard, persist
//!    with `next_update = now + refresh interval`
//!
//! `next_update` is written but never read here; insights are not regenerated.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::auth::CallerId;
use crate::errors::AppError;
use crate::insights::generator::InsightGenerator;
use crate::insights::models::NewIndustryInsight;
use crate::insights::single_flight::{insight_lock_key, FlightGuard};
use crate::insights::store::InsightStore;
use crate::models::insight::IndustryInsightRow;

/// How often a request that lost the generation lock re-checks the store.
const WAIT_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Clone)]
pub struct InsightService {
    store: Arc<dyn InsightStore>,
    generator: InsightGenerator,
    guard: Arc<dyn FlightGuard>,
    refresh_interval: chrono::Duration,
    /// Polls before giving up on the lock holder. Covers the whole lock TTL,
    /// since the holder keeps the lock for at most that long.
    wait_attempts: u32,
}

impl InsightService {
    pub fn new(
        store: Arc<dyn InsightStore>,
        generator: InsightGenerator,
        guard: Arc<dyn FlightGuard>,
        refresh_days: i64,
        lock_ttl: Duration,
    ) -> Self {
        let wait_attempts = lock_ttl
            .as_millis()
            .div_ceil(WAIT_INTERVAL.as_millis())
            .clamp(1, u32::MAX as u128) as u32;
        Self {
            store,
            generator,
            guard,
            refresh_interval: chrono::Duration::days(refresh_days),
            wait_attempts,
        }
    }

    /// Returns the insight linked to the caller, creating it on first access.
    pub async fn get_industry_insights(
        &self,
        caller: Option<&CallerId>,
    ) -> Result<IndustryInsightRow, AppError> {
        let caller = caller.ok_or(AppError::Unauthorized)?;

        let account = self
            .store
            .find_account(caller.as_str())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if let Some(insight) = account.insight {
            return Ok(insight);
        }

        let industry = account
            .user
            .onboarded_industry()
            .ok_or(AppError::OnboardingRequired)?;

        info!("No insight for {industry} yet, generating for user {}", account.user.id);
        self.create_for_industry(industry).await
    }

    /// Returns the existing insight for `industry` or creates one.
    pub async fn ensure_insight(&self, industry: &str) -> Result<IndustryInsightRow, AppError> {
        if let Some(existing) = self.store.find_insight(industry).await? {
            return Ok(existing);
        }
        self.create_for_industry(industry).await
    }

    async fn create_for_industry(&self, industry: &str) -> Result<IndustryInsightRow, AppError> {
        let key = insight_lock_key(industry);

        let token = match self.guard.try_acquire(&key).await {
            Ok(Some(token)) => Some(token),
            Ok(None) => {
                if let Some(row) = self.wait_for_insight(industry).await? {
                    return Ok(row);
                }
                warn!("Gave up waiting on concurrent generation for {industry}, generating");
                None
            }
            Err(e) => {
                warn!("Insight lock unavailable for {industry}, continuing unguarded: {e:#}");
                None
            }
        };

        let result = self.generate_and_store(industry).await;

        if let Some(token) = token {
            if let Err(e) = self.guard.release(&key, &token).await {
                warn!("Failed to release insight lock {key}: {e:#}");
            }
        }

        result
    }

    async fn wait_for_insight(
        &self,
        industry: &str,
    ) -> Result<Option<IndustryInsightRow>, AppError> {
        for _ in 0..self.wait_attempts {
            tokio::time::sleep(WAIT_INTERVAL).await;
            if let Some(row) = self.store.find_insight(industry).await? {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }

    async fn generate_and_store(&self, industry: &str) -> Result<IndustryInsightRow, AppError> {
        let insights = self.generator.generate(industry).await;
        if insights.is_placeholder() {
            warn!("Persisting placeholder insights for {industry}");
        }

        let new = NewIndustryInsight {
            industry: industry.to_string(),
            insights,
            next_update: Utc::now() + self.refresh_interval,
        };

        self.store.create_insight(new).await.map_err(|e| {
            error!("Error creating industry insight for {industry}: {e}");
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::models::IndustryInsights;
    use crate::insights::test_support::{
        insight_row, user_with_industry, LocalFlightGuard, MemoryStore, StubTextGenerator,
        VALID_INSIGHTS_JSON,
    };
    use axum::http::StatusCode;

    fn service(
        store: Arc<MemoryStore>,
        llm: Arc<StubTextGenerator>,
        guard: Arc<LocalFlightGuard>,
    ) -> InsightService {
        InsightService::new(
            store,
            InsightGenerator::new(llm),
            guard,
            7,
            Duration::from_secs(120),
        )
    }

    fn caller(id: &str) -> CallerId {
        CallerId(id.to_string())
    }

    #[tokio::test]
    async fn test_no_identity_is_unauthorized_without_lookup() {
        let store = Arc::new(MemoryStore::default());
        let llm = Arc::new(StubTextGenerator::replying(VALID_INSIGHTS_JSON));
        let svc = service(store.clone(), llm.clone(), Arc::new(LocalFlightGuard::default()));

        let err = svc.get_industry_insights(None).await.unwrap_err();

        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(store.account_lookups(), 0);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let store = Arc::new(MemoryStore::default());
        let llm = Arc::new(StubTextGenerator::replying(VALID_INSIGHTS_JSON));
        let svc = service(store.clone(), llm.clone(), Arc::new(LocalFlightGuard::default()));

        let err = svc
            .get_industry_insights(Some(&caller("user_missing")))
            .await
            .unwrap_err();

        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(store.account_lookups(), 1);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_existing_insight_returned_unchanged() {
        let store = Arc::new(MemoryStore::default());
        store.add_user(user_with_industry("user_1", Some("Technology")));
        let existing = insight_row("Technology");
        store.add_insight(existing.clone());
        let llm = Arc::new(StubTextGenerator::replying(VALID_INSIGHTS_JSON));
        let svc = service(store.clone(), llm.clone(), Arc::new(LocalFlightGuard::default()));

        let row = svc
            .get_industry_insights(Some(&caller("user_1")))
            .await
            .unwrap();

        assert_eq!(row, existing);
        assert_eq!(llm.calls(), 0);
        assert_eq!(store.creates(), 0);
    }

    #[tokio::test]
    async fn test_first_access_generates_once_and_persists() {
        let store = Arc::new(MemoryStore::default());
        store.add_user(user_with_industry("user_1", Some("Technology")));
        let llm = Arc::new(StubTextGenerator::replying(VALID_INSIGHTS_JSON));
        let guard = Arc::new(LocalFlightGuard::default());
        let svc = service(store.clone(), llm.clone(), guard.clone());

        let before = Utc::now();
        let row = svc
            .get_industry_insights(Some(&caller("user_1")))
            .await
            .unwrap();

        assert_eq!(llm.calls(), 1);
        assert_eq!(store.creates(), 1);
        assert_eq!(store.insight_count(), 1);
        assert_eq!(row.industry, "Technology");
        assert_eq!(row.demand_level, "High");
        assert_eq!(row.salary_ranges.0.len(), 2);

        let expected = before + chrono::Duration::days(7);
        let drift = (row.next_update - expected).num_seconds().abs();
        assert!(drift <= 5, "next_update off by {drift}s");

        assert!(!guard.is_held("coach:insight-lock:Technology"), "lock released");
    }

    #[tokio::test]
    async fn test_generation_failure_still_persists_placeholder() {
        let store = Arc::new(MemoryStore::default());
        store.add_user(user_with_industry("user_1", Some("Retail")));
        let llm = Arc::new(StubTextGenerator::failing());
        let svc = service(store.clone(), llm.clone(), Arc::new(LocalFlightGuard::default()));

        let row = svc
            .get_industry_insights(Some(&caller("user_1")))
            .await
            .unwrap();

        assert_eq!(store.creates(), 1);
        assert_eq!(row.demand_level, "Medium");
        assert_eq!(row.market_outlook, "Neutral");
        assert!(row.top_skills.is_empty());
        assert_eq!(row.growth_rate, IndustryInsights::default().growth_rate);
    }

    #[tokio::test]
    async fn test_persistence_failure_is_internal_error() {
        let store = Arc::new(MemoryStore::failing_creates());
        store.add_user(user_with_industry("user_1", Some("Technology")));
        let llm = Arc::new(StubTextGenerator::replying(VALID_INSIGHTS_JSON));
        let guard = Arc::new(LocalFlightGuard::default());
        let svc = service(store.clone(), llm, guard.clone());

        let err = svc
            .get_industry_insights(Some(&caller("user_1")))
            .await
            .unwrap_err();

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!guard.is_held("coach:insight-lock:Technology"));
    }

    #[tokio::test]
    async fn test_user_without_industry_must_onboard() {
        let store = Arc::new(MemoryStore::default());
        store.add_user(user_with_industry("user_1", None));
        let llm = Arc::new(StubTextGenerator::replying(VALID_INSIGHTS_JSON));
        let svc = service(store.clone(), llm.clone(), Arc::new(LocalFlightGuard::default()));

        let err = svc
            .get_industry_insights(Some(&caller("user_1")))
            .await
            .unwrap_err();

        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lock_loser_reuses_winners_row() {
        let store = Arc::new(MemoryStore::default());
        store.add_user(user_with_industry("user_2", Some("Technology")));
        let llm = Arc::new(StubTextGenerator::replying(VALID_INSIGHTS_JSON));
        let guard = Arc::new(LocalFlightGuard::default());
        guard.hold("coach:insight-lock:Technology");
        let svc = service(store.clone(), llm.clone(), guard);

        // The lock holder finishes while this request is polling.
        let winner_store = store.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(700)).await;
            winner_store.add_insight(insight_row("Technology"));
        });

        let row = svc
            .get_industry_insights(Some(&caller("user_2")))
            .await
            .unwrap();

        assert_eq!(row.industry, "Technology");
        assert_eq!(llm.calls(), 0);
        assert_eq!(store.creates(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lock_loser_waits_out_a_slow_winner() {
        let store = Arc::new(MemoryStore::default());
        store.add_user(user_with_industry("user_2", Some("Technology")));
        let llm = Arc::new(StubTextGenerator::replying(VALID_INSIGHTS_JSON));
        let guard = Arc::new(LocalFlightGuard::default());
        guard.hold("coach:insight-lock:Technology");
        let svc = service(store.clone(), llm.clone(), guard);

        // A realistic model call: well past ten seconds, inside the lock TTL.
        let winner_store = store.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(45)).await;
            winner_store.add_insight(insight_row("Technology"));
        });

        let row = svc
            .get_industry_insights(Some(&caller("user_2")))
            .await
            .unwrap();

        assert_eq!(row.industry, "Technology");
        assert_eq!(llm.calls(), 0);
        assert_eq!(store.creates(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_budget_follows_lock_ttl() {
        let store = Arc::new(MemoryStore::default());
        store.add_user(user_with_industry("user_2", Some("Technology")));
        let llm = Arc::new(StubTextGenerator::replying(VALID_INSIGHTS_JSON));
        let guard = Arc::new(LocalFlightGuard::default());
        guard.hold("coach:insight-lock:Technology");
        let svc = InsightService::new(
            store.clone(),
            InsightGenerator::new(llm.clone()),
            guard,
            7,
            Duration::from_secs(3),
        );

        let started = tokio::time::Instant::now();
        svc.get_industry_insights(Some(&caller("user_2")))
            .await
            .unwrap();

        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(3) && waited < Duration::from_secs(4), "{waited:?}");
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lock_loser_generates_after_timeout() {
        let store = Arc::new(MemoryStore::default());
        store.add_user(user_with_industry("user_2", Some("Technology")));
        let llm = Arc::new(StubTextGenerator::replying(VALID_INSIGHTS_JSON));
        let guard = Arc::new(LocalFlightGuard::default());
        guard.hold("coach:insight-lock:Technology");
        let svc = service(store.clone(), llm.clone(), guard.clone());

        svc.get_industry_insights(Some(&caller("user_2")))
            .await
            .unwrap();

        assert_eq!(llm.calls(), 1);
        assert_eq!(store.creates(), 1);
        // Not ours to release.
        assert!(guard.is_held("coach:insight-lock:Technology"));
    }

    #[tokio::test]
    async fn test_ensure_insight_skips_generation_when_present() {
        let store = Arc::new(MemoryStore::default());
        store.add_insight(insight_row("Finance"));
        let llm = Arc::new(StubTextGenerator::replying(VALID_INSIGHTS_JSON));
        let svc = service(store.clone(), llm.clone(), Arc::new(LocalFlightGuard::default()));

        let row = svc.ensure_insight("Finance").await.unwrap();

        assert_eq!(row.industry, "Finance");
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_create_keeps_first_writer() {
        let store = Arc::new(MemoryStore::default());
        let first = insight_row("Finance");
        store.add_insight(first.clone());

        let row = store
            .create_insight(NewIndustryInsight {
                industry: "Finance".to_string(),
                insights: IndustryInsights::default(),
                next_update: Utc::now(),
            })
            .await
            .unwrap();

        assert_eq!(row, first);
        assert_eq!(store.insight_count(), 1);
    }
}
