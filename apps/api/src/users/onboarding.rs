//! Onboarding: the profile that links a user to an industry.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::CallerId;
use crate::errors::AppError;
use crate::insights::service::InsightService;
use crate::models::user::User;
use crate::users::store::{ProfileUpdate, UserStore};

const MAX_EXPERIENCE_YEARS: i32 = 50;
const MAX_BIO_CHARS: usize = 500;

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRequest {
    pub industry: String,
    pub experience: Option<i32>,
    pub bio: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OnboardingStatus {
    pub is_onboarded: bool,
}

/// Normalises and checks onboarding answers.
pub fn validate_profile(request: ProfileRequest) -> Result<ProfileUpdate, AppError> {
    let industry = request.industry.trim().to_string();
    if industry.is_empty() {
        return Err(AppError::Validation("industry cannot be empty".to_string()));
    }

    if let Some(years) = request.experience {
        if !(0..=MAX_EXPERIENCE_YEARS).contains(&years) {
            return Err(AppError::Validation(format!(
                "experience must be between 0 and {MAX_EXPERIENCE_YEARS} years"
            )));
        }
    }

    let bio = request
        .bio
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty());
    if bio.as_ref().is_some_and(|b| b.chars().count() > MAX_BIO_CHARS) {
        return Err(AppError::Validation(format!(
            "bio cannot exceed {MAX_BIO_CHARS} characters"
        )));
    }

    let mut skills: Vec<String> = Vec::new();
    for skill in request.skills {
        let skill = skill.trim();
        if !skill.is_empty() && !skills.iter().any(|s| s.eq_ignore_ascii_case(skill)) {
            skills.push(skill.to_string());
        }
    }

    Ok(ProfileUpdate {
        industry,
        experience: request.experience,
        bio,
        skills,
    })
}

pub async fn onboarding_status(
    users: &dyn UserStore,
    caller: Option<&CallerId>,
) -> Result<OnboardingStatus, AppError> {
    let caller = caller.ok_or(AppError::Unauthorized)?;
    let user = users
        .find_user(caller.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(OnboardingStatus {
        is_onboarded: user.onboarded_industry().is_some(),
    })
}

/// Saves the onboarding profile. The industry's insight is created first so a
/// freshly onboarded user never lands on a dashboard without data.
pub async fn update_profile(
    users: &dyn UserStore,
    insights: &InsightService,
    caller: Option<&CallerId>,
    request: ProfileRequest,
) -> Result<User, AppError> {
    let caller = caller.ok_or(AppError::Unauthorized)?;
    let profile = validate_profile(request)?;

    if users.find_user(caller.as_str()).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    insights.ensure_insight(&profile.industry).await?;

    let user = users
        .update_profile(caller.as_str(), &profile)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    info!("User {} onboarded into {}", user.id, profile.industry);
    Ok(user)
}
