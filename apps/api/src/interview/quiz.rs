//! Mock-interview quiz generation.
//!
//! Unlike insights there is no useful placeholder quiz, so service and parse
//! failures surface as `AppError::Llm`. Individual malformed questions are
//! dropped; the quiz fails only if none survive.

use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::interview::models::QuizQuestion;
use crate::interview::prompts::QUIZ_PROMPT_TEMPLATE;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{strip_code_fences, TextGenerator};

pub const QUIZ_LENGTH: usize = 10;
const OPTIONS_PER_QUESTION: usize = 4;

#[derive(Debug, Deserialize)]
struct RawQuiz {
    questions: Vec<Value>,
}

pub fn build_quiz_prompt(industry: &str, skills: &[String]) -> String {
    let skills: Vec<&str> = skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    let skills_clause = if skills.is_empty() {
        String::new()
    } else {
        format!(" with expertise in {}", skills.join(", "))
    };

    QUIZ_PROMPT_TEMPLATE
        .replace("{count}", &QUIZ_LENGTH.to_string())
        .replace("{industry}", industry.trim())
        .replace("{skills_clause}", &skills_clause)
}

/// Parses the model's reply into at most `QUIZ_LENGTH` well-formed questions.
pub fn parse_quiz(raw: &str) -> Result<Vec<QuizQuestion>, AppError> {
    let cleaned = strip_code_fences(raw);
    let quiz: RawQuiz = serde_json::from_str(&cleaned)
        .map_err(|e| AppError::Llm(format!("Quiz response is not valid JSON: {e}")))?;

    let mut questions = Vec::with_capacity(QUIZ_LENGTH);
    for (index, value) in quiz.questions.into_iter().enumerate() {
        match serde_json::from_value::<QuizQuestion>(value) {
            Ok(question) if is_well_formed(&question) => questions.push(question),
            Ok(_) => warn!("Dropping quiz question {index}: options or answer malformed"),
            Err(e) => warn!("Dropping quiz question {index}: {e}"),
        }
    }
    questions.truncate(QUIZ_LENGTH);

    if questions.is_empty() {
        return Err(AppError::Llm("Quiz response had no usable questions".to_string()));
    }
    Ok(questions)
}

fn is_well_formed(question: &QuizQuestion) -> bool {
    let distinct: HashSet<&str> = question.options.iter().map(|o| o.trim()).collect();
    !question.question.trim().is_empty()
        && question.options.len() == OPTIONS_PER_QUESTION
        && distinct.len() == OPTIONS_PER_QUESTION
        && !distinct.contains("")
        && distinct.contains(question.correct_answer.trim())
}

/// Generates a quiz for `industry`, tailored to `skills` when any are given.
pub async fn generate_quiz(
    llm: &dyn TextGenerator,
    industry: &str,
    skills: &[String],
) -> Result<Vec<QuizQuestion>, AppError> {
    let prompt = build_quiz_prompt(industry, skills);
    let text = llm
        .generate_text(&prompt, JSON_ONLY_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Failed to generate quiz questions: {e}")))?;

    let questions = parse_quiz(&text)?;
    info!("Generated {} quiz questions for {industry}", questions.len());
    Ok(questions)
}
