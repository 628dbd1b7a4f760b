// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Quiz {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Represents the 'quiz_questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizQuestion {
    pub id: i64,
    pub quiz_id: i64,
    pub question_text: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Represents the 'quiz_options' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizOption {
    pub id: i64,
    pub question_id: i64,
    pub option_text: String,
    pub is_correct: bool,
}

/// One option of a question to be created, either typed in by the user or
/// produced by the generator.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct QuizOptionInput {
    #[validate(length(min = 1, max = 1000))]
    pub option_text: String,
    pub is_correct: bool,
}

/// One question of a quiz to be created.
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct QuizQuestionInput {
    #[validate(length(min = 1, max = 2000))]
    pub question_text: String,
    #[validate(length(min = 2, max = 10), nested)]
    pub options: Vec<QuizOptionInput>,
}

/// DTO for creating a quiz by hand.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100), nested)]
    pub questions: Vec<QuizQuestionInput>,
}

/// DTO for generating a quiz out of a document.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenerateQuizRequest {
    #[serde(default = "default_question_count")]
    #[validate(range(min = 1, max = 50))]
    pub num_questions: u32,
}

fn default_question_count() -> u32 {
    crate::config::DEFAULT_QUIZ_QUESTIONS
}

/// Full quiz as served to clients, questions and options nested in insertion
/// order. Correctness flags are included so the frontend can self-grade while
/// practicing.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuizDetail {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub questions: Vec<QuestionDetail>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionDetail {
    pub id: i64,
    pub question_text: String,
    pub options: Vec<OptionDetail>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OptionDetail {
    pub id: i64,
    pub option_text: String,
    pub is_correct: bool,
}

impl From<QuizOption> for OptionDetail {
    fn from(opt: QuizOption) -> Self {
        Self {
            id: opt.id,
            option_text: opt.option_text,
            is_correct: opt.is_correct,
        }
    }
}
