//! Grading and storing a finished quiz.

use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::interview::models::{
    AssessmentStats, NewAssessment, QuestionResult, QuizQuestion, TECHNICAL_CATEGORY,
};
use crate::interview::prompts::IMPROVEMENT_TIP_PROMPT_TEMPLATE;
use crate::interview::store::AssessmentStore;
use crate::llm_client::prompts::PLAIN_TEXT_SYSTEM;
use crate::llm_client::{strip_code_fences, TextGenerator};
use crate::models::assessment::AssessmentRow;
use crate::models::user::User;

#[derive(Debug, Clone, Deserialize)]
pub struct SaveAssessmentRequest {
    pub questions: Vec<QuizQuestion>,
    /// `answers[i]` is the option chosen for `questions[i]`; `None` if skipped.
    pub answers: Vec<Option<String>>,
}

/// Marks each answer and returns the results with the percentage score.
pub fn grade(
    questions: &[QuizQuestion],
    answers: &[Option<String>],
) -> Result<(Vec<QuestionResult>, f64), AppError> {
    if questions.is_empty() {
        return Err(AppError::Validation("questions cannot be empty".to_string()));
    }
    if questions.len() != answers.len() {
        return Err(AppError::Validation(format!(
            "expected {} answers, got {}",
            questions.len(),
            answers.len()
        )));
    }

    let results: Vec<QuestionResult> = questions
        .iter()
        .zip(answers)
        .map(|(q, answer)| {
            let user_answer = answer
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string);
            QuestionResult {
                is_correct: user_answer.as_deref() == Some(q.correct_answer.trim()),
                question: q.question.clone(),
                answer: q.correct_answer.clone(),
                user_answer,
                explanation: q.explanation.clone(),
            }
        })
        .collect();

    let correct = results.iter().filter(|r| r.is_correct).count();
    let score = correct as f64 / results.len() as f64 * 100.0;
    Ok((results, score))
}

pub fn build_tip_prompt(industry: &str, wrong: &[&QuestionResult]) -> String {
    let wrong_answers = wrong
        .iter()
        .map(|r| {
            format!(
                "Question: \"{}\"\nCorrect Answer: \"{}\"\nUser Answer: \"{}\"",
                r.question,
                r.answer,
                r.user_answer.as_deref().unwrap_or("(no answer)")
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    IMPROVEMENT_TIP_PROMPT_TEMPLATE
        .replace("{industry}", industry)
        .replace("{wrong_answers}", &wrong_answers)
}

/// Asks the model for a study tip. A failed or empty reply yields `None`.
async fn improvement_tip(
    llm: &dyn TextGenerator,
    industry: &str,
    wrong: &[&QuestionResult],
) -> Option<String> {
    let prompt = build_tip_prompt(industry, wrong);
    match llm.generate_text(&prompt, PLAIN_TEXT_SYSTEM).await {
        Ok(text) => {
            let tip = strip_code_fences(&text);
            (!tip.is_empty()).then_some(tip)
        }
        Err(e) => {
            warn!("Improvement tip generation failed for {industry}: {e}");
            None
        }
    }
}

/// Grades the submission and stores it as an assessment for `user`.
pub async fn save_assessment(
    store: &dyn AssessmentStore,
    llm: &dyn TextGenerator,
    user: &User,
    industry: &str,
    request: SaveAssessmentRequest,
) -> Result<AssessmentRow, AppError> {
    let (results, score) = grade(&request.questions, &request.answers)?;

    let wrong: Vec<&QuestionResult> = results.iter().filter(|r| !r.is_correct).collect();
    let improvement_tip = if wrong.is_empty() {
        None
    } else {
        improvement_tip(llm, industry, &wrong).await
    };

    let row = store
        .create_assessment(NewAssessment {
            user_id: user.id,
            quiz_score: score,
            questions: results,
            category: TECHNICAL_CATEGORY.to_string(),
            improvement_tip,
        })
        .await?;

    info!("Stored assessment {} for user {} ({score:.0}%)", row.id, user.id);
    Ok(row)
}

/// Summarises assessments given oldest first.
pub fn assessment_stats(assessments: &[AssessmentRow]) -> AssessmentStats {
    let total_quizzes = assessments.len();
    let average_score = if total_quizzes == 0 {
        0.0
    } else {
        assessments.iter().map(|a| a.quiz_score).sum::<f64>() / total_quizzes as f64
    };

    AssessmentStats {
        average_score,
        questions_practiced: assessments.iter().map(|a| a.questions.0.len()).sum(),
        latest_score: assessments.last().map(|a| a.quiz_score),
        total_quizzes,
    }
}
