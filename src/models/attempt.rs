// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Represents the 'quiz_attempts' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizAttempt {
    pub id: i64,
    pub quiz_id: i64,
    pub user_id: i64,
    pub score: f64,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// One submitted answer: which option was picked for which question.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct SubmittedAnswer {
    pub question_id: i64,
    pub selected_option_id: i64,
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitAttemptRequest {
    #[validate(length(max = 500))]
    pub answers: Vec<SubmittedAnswer>,
}

/// Per-answer feedback returned with the graded attempt. When a question has
/// no option flagged correct, the `correct_option_*` fields stay empty.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnswerFeedback {
    pub question_id: i64,
    pub question_text: String,
    pub selected_option_id: i64,
    pub selected_option_text: String,
    pub is_correct: bool,
    pub correct_option_id: Option<i64>,
    pub correct_option_text: Option<String>,
}

/// Graded attempt with the percentage score and answer-by-answer feedback.
#[derive(Debug, Serialize, ToSchema)]
pub struct AttemptResponse {
    pub id: i64,
    pub quiz_id: i64,
    pub score: f64,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub answers: Vec<AnswerFeedback>,
}
