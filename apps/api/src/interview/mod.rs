// Interview preparation: AI-generated multiple-choice quizzes per industry,
// graded server-side and stored as assessments with an optional study tip.

pub mod assessment;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod quiz;
pub mod store;
