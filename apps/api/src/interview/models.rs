use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Assessments are all technical quizzes for now.
pub const TECHNICAL_CATEGORY: &str = "Technical";

/// One multiple-choice question as generated by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

/// How the user did on one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResult {
    pub question: String,
    /// The correct option.
    pub answer: String,
    pub user_answer: Option<String>,
    pub is_correct: bool,
    pub explanation: String,
}

#[derive(Debug, Clone)]
pub struct NewAssessment {
    pub user_id: Uuid,
    pub quiz_score: f64,
    pub questions: Vec<QuestionResult>,
    pub category: String,
    pub improvement_tip: Option<String>,
}

/// Summary shown above the assessment list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentStats {
    pub average_score: f64,
    pub questions_practiced: usize,
    pub latest_score: Option<f64>,
    pub total_quizzes: usize,
}
