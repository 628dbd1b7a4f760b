// src/lib.rs

pub mod ai;
pub mod config;
pub mod error;
pub mod handlers;
pub mod ingest;
pub mod models;
pub mod quiz;
pub mod routes;
pub mod state;
pub mod tasks;
pub mod utils;

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::models::attempt::{
    AnswerFeedback, AttemptResponse, SubmitAttemptRequest, SubmittedAnswer,
};
use crate::models::document::{AskQuestionRequest, DocumentResponse, QuestionResponse};
use crate::models::quiz::{
    CreateQuizRequest, GenerateQuizRequest, OptionDetail, QuestionDetail, QuizDetail,
    QuizOptionInput, QuizQuestionInput,
};
use crate::models::user::{
    CreateUserRequest, LoginRequest, LoginResponse, UserResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::document::create_text_document,
        handlers::document::create_image_document,
        handlers::document::create_file_document,
        handlers::document::list_documents,
        handlers::document::get_document,
        handlers::document::request_summary,
        handlers::document::ask_question,
        handlers::quiz::create_quiz,
        handlers::quiz::list_quizzes,
        handlers::quiz::get_quiz,
        handlers::quiz::generate_quiz_from_document,
        handlers::quiz::submit_attempt,
    ),
    components(schemas(
        CreateUserRequest,
        LoginRequest,
        LoginResponse,
        UserResponse,
        DocumentResponse,
        AskQuestionRequest,
        QuestionResponse,
        CreateQuizRequest,
        QuizQuestionInput,
        QuizOptionInput,
        GenerateQuizRequest,
        QuizDetail,
        QuestionDetail,
        OptionDetail,
        SubmitAttemptRequest,
        SubmittedAnswer,
        AttemptResponse,
        AnswerFeedback,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "documents", description = "Document upload, summaries and Q&A"),
        (name = "quizzes", description = "Quiz creation, generation and attempts")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

// Re-export specific items for convenience if needed
pub use routes::create_router;
