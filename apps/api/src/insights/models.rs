//! Insight payload types as exchanged with the model and returned by the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Hiring demand for an industry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DemandLevel {
    High,
    #[default]
    Medium,
    Low,
}

impl DemandLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemandLevel::High => "High",
            DemandLevel::Medium => "Medium",
            DemandLevel::Low => "Low",
        }
    }

    /// Case-insensitive match on the label. Unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" => Some(DemandLevel::High),
            "medium" => Some(DemandLevel::Medium),
            "low" => Some(DemandLevel::Low),
            _ => None,
        }
    }
}

/// Overall market direction for an industry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketOutlook {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl MarketOutlook {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketOutlook::Positive => "Positive",
            MarketOutlook::Neutral => "Neutral",
            MarketOutlook::Negative => "Negative",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(MarketOutlook::Positive),
            "neutral" => Some(MarketOutlook::Neutral),
            "negative" => Some(MarketOutlook::Negative),
            _ => None,
        }
    }
}

/// Salary band for one role. Amounts are annual, in the currency the model chose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub role: String,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: String,
}

/// Accepts a missing, null or non-string value where a label is expected.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}

/// Accepts a list whose items are not all strings. Scalars are rendered as
/// text and nulls are dropped; anything other than a list is still rejected.
pub(crate) fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Vec::<Value>::deserialize(deserializer)?
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            Value::Null => None,
            other => Some(other.to_string()),
        })
        .collect())
}

/// Validated insight payload produced by the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryInsights {
    pub salary_ranges: Vec<SalaryRange>,
    /// Percentage.
    pub growth_rate: f64,
    pub demand_level: DemandLevel,
    pub top_skills: Vec<String>,
    pub market_outlook: MarketOutlook,
    pub key_trends: Vec<String>,
    pub recommended_skills: Vec<String>,
}

impl Default for IndustryInsights {
    /// The placeholder returned on every generation or validation failure:
    /// empty lists, zero growth, `Medium` demand, `Neutral` outlook.
    fn default() -> Self {
        Self {
            salary_ranges: Vec::new(),
            growth_rate: 0.0,
            demand_level: DemandLevel::Medium,
            top_skills: Vec::new(),
            market_outlook: MarketOutlook::Neutral,
            key_trends: Vec::new(),
            recommended_skills: Vec::new(),
        }
    }
}

impl IndustryInsights {
    pub fn is_placeholder(&self) -> bool {
        *self == Self::default()
    }
}

/// Everything needed to persist a freshly generated insight.
#[derive(Debug, Clone)]
pub struct NewIndustryInsight {
    pub industry: String,
    pub insights: IndustryInsights,
    pub next_update: DateTime<Utc>,
}
