// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    ai::AiClient,
    error::AppError,
    models::{
        attempt::{AttemptResponse, SubmitAttemptRequest},
        document::Document,
        quiz::{CreateQuizRequest, GenerateQuizRequest, QuizDetail, QuizQuestionInput},
    },
    quiz::{assembly, scoring},
    utils::jwt::Claims,
};

/// Creates a quiz from a hand-written question set.
///
/// Every question must carry exactly one correct option; the whole quiz is
/// written in one transaction or not at all.
#[utoipa::path(
    post,
    path = "/api/quizzes",
    request_body = CreateQuizRequest,
    responses(
        (status = 201, description = "Quiz created", body = QuizDetail),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "quizzes"
)]
pub async fn create_quiz(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user_id: i64 = claims
        .sub
        .parse()
        .map_err(|_| AppError::AuthError("Invalid user ID in token".to_string()))?;

    let quiz_id = assembly::create_quiz(
        &pool,
        user_id,
        &payload.title,
        payload.description.as_deref(),
        &payload.questions,
    )
    .await?;

    let quiz = assembly::fetch_quiz(&pool, quiz_id).await?;

    Ok((StatusCode::CREATED, Json(quiz)))
}

/// Lists the caller's quizzes with questions and options nested.
#[utoipa::path(
    get,
    path = "/api/quizzes",
    responses(
        (status = 200, description = "Quizzes owned by the caller", body = [QuizDetail]),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "quizzes"
)]
pub async fn list_quizzes(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id: i64 = claims
        .sub
        .parse()
        .map_err(|_| AppError::AuthError("Invalid user ID in token".to_string()))?;

    let quizzes = assembly::list_quizzes(&pool, user_id).await?;

    Ok(Json(quizzes))
}

/// Fetches one quiz by id, questions and options in insertion order.
#[utoipa::path(
    get,
    path = "/api/quizzes/{id}",
    params(("id" = i64, Path, description = "Quiz id")),
    responses(
        (status = 200, description = "The quiz", body = QuizDetail),
        (status = 404, description = "No such quiz")
    ),
    tag = "quizzes"
)]
pub async fn get_quiz(
    State(pool): State<PgPool>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = assembly::fetch_quiz(&pool, quiz_id).await?;

    Ok(Json(quiz))
}

/// Generates a quiz from a document the caller owns.
///
/// Question generation never fails outright: unusable model output is
/// replaced by a deterministic sample quiz of the requested size.
#[utoipa::path(
    post,
    path = "/api/documents/{id}/generate-quiz",
    params(("id" = i64, Path, description = "Document id")),
    request_body = GenerateQuizRequest,
    responses(
        (status = 201, description = "Quiz created", body = QuizDetail),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No such document for this user")
    ),
    security(("bearer_auth" = [])),
    tag = "quizzes"
)]
pub async fn generate_quiz_from_document(
    State(pool): State<PgPool>,
    State(ai): State<AiClient>,
    Path(document_id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<GenerateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user_id: i64 = claims
        .sub
        .parse()
        .map_err(|_| AppError::AuthError("Invalid user ID in token".to_string()))?;

    let document = sqlx::query_as::<_, Document>(
        r#"
        SELECT id, user_id, title, content, content_type, file_path, summary, created_at
        FROM documents
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(document_id)
    .bind(user_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Document not found".to_string()))?;

    let generated = ai.generate_quiz(&document, payload.num_questions).await;
    let questions: Vec<QuizQuestionInput> = generated.into_iter().map(Into::into).collect();

    let title = format!("Quiz on {}", document.title);
    let description = format!("Generated from: {}", document.title);

    let quiz_id =
        assembly::create_quiz(&pool, user_id, &title, Some(&description), &questions).await?;
    let quiz = assembly::fetch_quiz(&pool, quiz_id).await?;

    Ok((StatusCode::CREATED, Json(quiz)))
}

/// Submits answers for a quiz and returns the graded attempt.
///
/// Answers pointing at unknown questions, or at options that do not belong
/// to their question, are skipped; the score is taken over what remains.
#[utoipa::path(
    post,
    path = "/api/quizzes/{id}/attempt",
    params(("id" = i64, Path, description = "Quiz id")),
    request_body = SubmitAttemptRequest,
    responses(
        (status = 200, description = "Graded attempt", body = AttemptResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No such quiz")
    ),
    security(("bearer_auth" = [])),
    tag = "quizzes"
)]
pub async fn submit_attempt(
    State(pool): State<PgPool>,
    Path(quiz_id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SubmitAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user_id: i64 = claims
        .sub
        .parse()
        .map_err(|_| AppError::AuthError("Invalid user ID in token".to_string()))?;

    let attempt = scoring::score_attempt(&pool, quiz_id, user_id, &payload.answers).await?;

    Ok(Json(attempt))
}
