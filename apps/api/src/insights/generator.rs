//! Insight Generator — turns an industry label into a validated insight payload.
//!
//! Flow: build prompt → LLM call → strip code fences → parse JSON → check shape.
//!
//! `generate` is total: every failure branch (service error, invalid JSON,
//! wrong shape) is logged and collapses to `IndustryInsights::default()`.
//! No retries happen at this layer.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::insights::models::{
    lenient_strings, DemandLevel, IndustryInsights, MarketOutlook, SalaryRange,
};
use crate::insights::prompts::build_insights_prompt;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{strip_code_fences, LlmError, TextGenerator};

#[derive(Debug, Error)]
pub enum InsightError {
    #[error("generation service failed: {0}")]
    Service(#[from] LlmError),

    #[error("response is not valid JSON: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
        text: String,
    },

    #[error("response has an invalid insights format: {source}")]
    Shape {
        #[source]
        source: serde_json::Error,
        payload: Value,
    },
}

/// Wire shape expected from the model. Required fields have no serde default,
/// so a missing list or a non-numeric amount fails deserialization. List items
/// that are not strings are coerced rather than rejected.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInsights {
    salary_ranges: Vec<SalaryRange>,
    growth_rate: f64,
    #[serde(default)]
    demand_level: Option<Value>,
    #[serde(deserialize_with = "lenient_strings")]
    top_skills: Vec<String>,
    #[serde(default)]
    market_outlook: Option<Value>,
    #[serde(deserialize_with = "lenient_strings")]
    key_trends: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    recommended_skills: Vec<String>,
}

#[derive(Clone)]
pub struct InsightGenerator {
    llm: Arc<dyn TextGenerator>,
}

impl InsightGenerator {
    pub fn new(llm: Arc<dyn TextGenerator>) -> Self {
        Self { llm }
    }

    /// Generates insights for `industry`. Never fails; see module docs.
    pub async fn generate(&self, industry: &str) -> IndustryInsights {
        match self.try_generate(industry).await {
            Ok(insights) => {
                info!(
                    "Generated insights for {industry}: {} salary ranges, {} skills",
                    insights.salary_ranges.len(),
                    insights.top_skills.len()
                );
                insights
            }
            Err(InsightError::Parse { source, text }) => {
                error!("Insight JSON parse error for {industry}: {source}; text: {text}");
                IndustryInsights::default()
            }
            Err(InsightError::Shape { source, payload }) => {
                error!("Invalid insights format for {industry}: {source}; payload: {payload}");
                IndustryInsights::default()
            }
            Err(e) => {
                error!("Insight generation failed for {industry}: {e}");
                IndustryInsights::default()
            }
        }
    }

    async fn try_generate(&self, industry: &str) -> Result<IndustryInsights, InsightError> {
        let prompt = build_insights_prompt(industry);
        let text = self.llm.generate_text(&prompt, JSON_ONLY_SYSTEM).await?;
        parse_insights(&text)
    }
}

/// Cleans and validates raw model output.
pub fn parse_insights(raw: &str) -> Result<IndustryInsights, InsightError> {
    let cleaned = strip_code_fences(raw);

    let value: Value = match serde_json::from_str(&cleaned) {
        Ok(value) => value,
        Err(source) => {
            return Err(InsightError::Parse {
                source,
                text: cleaned,
            })
        }
    };

    let parsed: RawInsights =
        serde_json::from_value(value.clone()).map_err(|source| InsightError::Shape {
            source,
            payload: value,
        })?;

    Ok(IndustryInsights {
        salary_ranges: parsed.salary_ranges,
        growth_rate: parsed.growth_rate,
        demand_level: label_or_default(
            parsed.demand_level.as_ref(),
            DemandLevel::from_label,
            "demandLevel",
        ),
        top_skills: parsed.top_skills,
        market_outlook: label_or_default(
            parsed.market_outlook.as_ref(),
            MarketOutlook::from_label,
            "marketOutlook",
        ),
        key_trends: parsed.key_trends,
        recommended_skills: parsed.recommended_skills,
    })
}

/// Enum labels are not part of the shape check; unknown values fall back to the default.
fn label_or_default<T: Default>(
    value: Option<&Value>,
    parse: fn(&str) -> Option<T>,
    field: &str,
) -> T {
    match value.and_then(Value::as_str).and_then(parse) {
        Some(parsed) => parsed,
        None => {
            warn!("Unrecognised {field} {value:?}; using default");
            T::default()
        }
    }
}
