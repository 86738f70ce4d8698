//! In-memory doubles for the store, LLM and lock traits, shared by every
//! domain's tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use crate::errors::AppError;
use crate::insights::models::{NewIndustryInsight, SalaryRange};
use crate::insights::single_flight::FlightGuard;
use crate::insights::store::{Account, InsightStore};
use crate::interview::models::NewAssessment;
use crate::interview::store::AssessmentStore;
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::assessment::AssessmentRow;
use crate::models::insight::IndustryInsightRow;
use crate::models::user::User;
use crate::users::store::{ProfileUpdate, SyncUser, UserStore};

pub const VALID_INSIGHTS_JSON: &str = r#"{
    "salaryRanges": [
        {"role": "Software Engineer", "min": 85000, "max": 180000, "median": 125000, "location": "US"},
        {"role": "Site Reliability Engineer", "min": 95000, "max": 190000, "median": 140000, "location": "US"}
    ],
    "growthRate": 6.2,
    "demandLevel": "High",
    "topSkills": ["Rust", "Go", "Kubernetes", "SQL", "Observability"],
    "marketOutlook": "Positive",
    "keyTrends": ["AI tooling", "Platform engineering", "Cost optimisation", "Security", "Edge"],
    "recommendedSkills": ["LLM integration", "Terraform"]
}"#;

pub const VALID_QUIZ_JSON: &str = r#"{
    "questions": [
        {
            "question": "Which Rust concept guarantees a value has a single owner?",
            "options": ["Ownership", "Garbage collection", "Reference counting", "Reflection"],
            "correctAnswer": "Ownership",
            "explanation": "Each value has exactly one owner at a time."
        },
        {
            "question": "Which HTTP status means the resource was not found?",
            "options": ["200", "301", "404", "500"],
            "correctAnswer": "404",
            "explanation": "404 Not Found."
        }
    ]
}"#;

pub fn user_with_industry(external_id: &str, industry: Option<&str>) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        external_id: external_id.to_string(),
        email: format!("{external_id}@example.com"),
        name: Some("Test User".to_string()),
        image_url: None,
        industry: industry.map(str::to_string),
        experience: None,
        bio: None,
        skills: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

pub fn insight_row(industry: &str) -> IndustryInsightRow {
    let now = Utc::now();
    IndustryInsightRow {
        id: Uuid::new_v4(),
        industry: industry.to_string(),
        salary_ranges: Json(vec![SalaryRange {
            role: "Analyst".to_string(),
            min: 50000.0,
            max: 90000.0,
            median: 70000.0,
            location: "Remote".to_string(),
        }]),
        growth_rate: 3.0,
        demand_level: "Low".to_string(),
        top_skills: vec!["Excel".to_string()],
        market_outlook: "Negative".to_string(),
        key_trends: vec!["Consolidation".to_string()],
        recommended_skills: vec!["Python".to_string()],
        last_updated: now,
        next_update: now + Duration::days(7),
    }
}

/// Returns a canned reply (or error) and records every prompt it was given.
pub struct StubTextGenerator {
    reply: Option<String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl StubTextGenerator {
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Some(text.into()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextGenerator for StubTextGenerator {
    async fn generate_text(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().ok_or(LlmError::Api {
            status: 503,
            message: "overloaded".to_string(),
        })
    }
}

/// Store double keyed like the real schema: users by external id, insights by industry.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    insights: Mutex<HashMap<String, IndustryInsightRow>>,
    assessments: Mutex<Vec<AssessmentRow>>,
    account_lookups: AtomicUsize,
    creates: AtomicUsize,
    fail_creates: bool,
}

impl MemoryStore {
    pub fn failing_creates() -> Self {
        Self {
            fail_creates: true,
            ..Self::default()
        }
    }

    pub fn add_user(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    pub fn add_insight(&self, row: IndustryInsightRow) {
        self.insights
            .lock()
            .unwrap()
            .insert(row.industry.clone(), row);
    }

    pub fn account_lookups(&self) -> usize {
        self.account_lookups.load(Ordering::SeqCst)
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn insight_count(&self) -> usize {
        self.insights.lock().unwrap().len()
    }

    fn user(&self, external_id: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.external_id == external_id)
            .cloned()
    }
}

#[async_trait]
impl InsightStore for MemoryStore {
    async fn find_account(&self, external_id: &str) -> Result<Option<Account>, AppError> {
        self.account_lookups.fetch_add(1, Ordering::SeqCst);
        let Some(user) = self.user(external_id) else {
            return Ok(None);
        };
        let insight = user
            .onboarded_industry()
            .and_then(|industry| self.insights.lock().unwrap().get(industry).cloned());
        Ok(Some(Account { user, insight }))
    }

    async fn find_insight(&self, industry: &str) -> Result<Option<IndustryInsightRow>, AppError> {
        Ok(self.insights.lock().unwrap().get(industry).cloned())
    }

    async fn create_insight(
        &self,
        new: NewIndustryInsight,
    ) -> Result<IndustryInsightRow, AppError> {
        if self.fail_creates {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        let mut insights = self.insights.lock().unwrap();
        if let Some(existing) = insights.get(&new.industry) {
            return Ok(existing.clone());
        }
        self.creates.fetch_add(1, Ordering::SeqCst);
        let row = IndustryInsightRow {
            id: Uuid::new_v4(),
            industry: new.industry.clone(),
            salary_ranges: Json(new.insights.salary_ranges),
            growth_rate: new.insights.growth_rate,
            demand_level: new.insights.demand_level.as_str().to_string(),
            top_skills: new.insights.top_skills,
            market_outlook: new.insights.market_outlook.as_str().to_string(),
            key_trends: new.insights.key_trends,
            recommended_skills: new.insights.recommended_skills,
            last_updated: Utc::now(),
            next_update: new.next_update,
        };
        insights.insert(new.industry, row.clone());
        Ok(row)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, external_id: &str) -> Result<Option<User>, AppError> {
        Ok(self.user(external_id))
    }

    async fn upsert_user(&self, external_id: &str, sync: &SyncUser) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.external_id == external_id) {
            user.email = sync.email.clone();
            user.name = sync.name.clone();
            user.image_url = sync.image_url.clone();
            return Ok(user.clone());
        }
        let mut user = user_with_industry(external_id, None);
        user.email = sync.email.clone();
        user.name = sync.name.clone();
        user.image_url = sync.image_url.clone();
        users.push(user.clone());
        Ok(user)
    }

    async fn update_profile(
        &self,
        external_id: &str,
        profile: &ProfileUpdate,
    ) -> Result<Option<User>, AppError> {
        let mut users = self.users.lock().unwrap();
        Ok(users
            .iter_mut()
            .find(|u| u.external_id == external_id)
            .map(|user| {
                user.industry = Some(profile.industry.clone());
                user.experience = profile.experience;
                user.bio = profile.bio.clone();
                user.skills = profile.skills.clone();
                user.clone()
            }))
    }
}

#[async_trait]
impl AssessmentStore for MemoryStore {
    async fn create_assessment(&self, new: NewAssessment) -> Result<AssessmentRow, AppError> {
        let mut assessments = self.assessments.lock().unwrap();
        // Strictly increasing timestamps keep the oldest-first order deterministic.
        let created_at = assessments
            .last()
            .map(|last| last.created_at + Duration::milliseconds(1))
            .unwrap_or_else(Utc::now);
        let row = AssessmentRow {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            quiz_score: new.quiz_score,
            questions: Json(new.questions),
            category: new.category,
            improvement_tip: new.improvement_tip,
            created_at,
        };
        assessments.push(row.clone());
        Ok(row)
    }

    async fn list_assessments(&self, user_id: Uuid) -> Result<Vec<AssessmentRow>, AppError> {
        let mut rows: Vec<AssessmentRow> = self
            .assessments
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|a| a.created_at);
        Ok(rows)
    }
}

/// Process-local lock. `hold` simulates another request owning a key.
#[derive(Default)]
pub struct LocalFlightGuard {
    held: Mutex<HashMap<String, String>>,
    issued: AtomicUsize,
}

impl LocalFlightGuard {
    pub fn hold(&self, key: &str) {
        self.held
            .lock()
            .unwrap()
            .insert(key.to_string(), "other-request".to_string());
    }

    /// Drops `key` as if its expiry had passed.
    pub fn expire(&self, key: &str) {
        self.held.lock().unwrap().remove(key);
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.held.lock().unwrap().contains_key(key)
    }
}

#[async_trait]
impl FlightGuard for LocalFlightGuard {
    async fn try_acquire(&self, key: &str) -> anyhow::Result<Option<String>> {
        let mut held = self.held.lock().unwrap();
        if held.contains_key(key) {
            return Ok(None);
        }
        let token = format!("token-{}", self.issued.fetch_add(1, Ordering::SeqCst));
        held.insert(key.to_string(), token.clone());
        Ok(Some(token))
    }

    async fn release(&self, key: &str, token: &str) -> anyhow::Result<()> {
        let mut held = self.held.lock().unwrap();
        if held.get(key).map(String::as_str) == Some(token) {
            held.remove(key);
        }
        Ok(())
    }
}
