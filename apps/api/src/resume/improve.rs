//! AI rewrite of a single resume entry description.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::prompts::PLAIN_TEXT_SYSTEM;
use crate::llm_client::{strip_code_fences, TextGenerator};
use crate::resume::markdown::EntryType;
use crate::resume::prompts::IMPROVE_PROMPT_TEMPLATE;

const MAX_CURRENT_CHARS: usize = 4000;

#[derive(Debug, Clone, Deserialize)]
pub struct ImproveRequest {
    pub current: String,
    pub entry_type: EntryType,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImproveResponse {
    pub improved: String,
}

pub fn build_improve_prompt(industry: &str, request: &ImproveRequest) -> String {
    IMPROVE_PROMPT_TEMPLATE
        .replace("{entry_type}", request.entry_type.as_str())
        .replace("{industry}", industry)
        .replace("{current}", request.current.trim())
}

/// Rewrites `request.current` for the user's industry. Unlike insights there is
/// no safe default here, so generation failures surface as `AppError::Llm`.
pub async fn improve_entry(
    llm: &dyn TextGenerator,
    industry: &str,
    request: &ImproveRequest,
) -> Result<String, AppError> {
    let current = request.current.trim();
    if current.is_empty() {
        return Err(AppError::Validation("current cannot be empty".to_string()));
    }
    if current.chars().count() > MAX_CURRENT_CHARS {
        return Err(AppError::Validation(format!(
            "current cannot exceed {MAX_CURRENT_CHARS} characters"
        )));
    }

    let prompt = build_improve_prompt(industry, request);
    let text = llm
        .generate_text(&prompt, PLAIN_TEXT_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Failed to improve content: {e}")))?;

    let improved = clean_paragraph(&text);
    if improved.is_empty() {
        return Err(AppError::Llm("Model returned an empty rewrite".to_string()));
    }
    Ok(improved)
}

/// Drops fences and wrapping quotes, and joins the reply into one paragraph.
fn clean_paragraph(text: &str) -> String {
    let stripped = strip_code_fences(text);
    let unquoted = stripped
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(&stripped);
    unquoted.split_whitespace().collect::<Vec<_>>().join(" ")
}
