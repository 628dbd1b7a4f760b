// src/handlers/document.rs

use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use tokio::sync::mpsc;
use validator::Validate;

use crate::{
    ai::AiClient,
    config::Config,
    error::AppError,
    ingest,
    models::document::{
        AskQuestionRequest, Document, DocumentQuestion, DocumentResponse, QuestionResponse,
    },
    tasks::SummaryJob,
    utils::jwt::Claims,
};

/// One file part pulled out of a multipart body.
struct UploadedFile {
    file_name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

/// Reads the 'title' text part and the named file part. Anything else in the
/// body is ignored.
async fn read_title_and_file(
    mut multipart: Multipart,
    file_field: &str,
) -> Result<(String, UploadedFile), AppError> {
    let mut title: Option<String> = None;
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "title" {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(format!("Invalid 'title' field: {}", e)))?;
            title = Some(text);
        } else if name == file_field {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let content_type = field.content_type().map(|ct| ct.to_string());
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Invalid '{}' field: {}", name, e)))?
                .to_vec();
            file = Some(UploadedFile {
                file_name,
                content_type,
                bytes,
            });
        }
    }

    let title = title.ok_or(AppError::BadRequest("Missing 'title' field".to_string()))?;
    let file =
        file.ok_or_else(|| AppError::BadRequest(format!("Missing '{}' field", file_field)))?;

    if title.trim().is_empty() {
        return Err(AppError::BadRequest("Title must not be empty".to_string()));
    }

    Ok((title, file))
}

async fn insert_document(
    pool: &PgPool,
    user_id: i64,
    title: &str,
    content: Option<&str>,
    content_type: &str,
    file_path: Option<&str>,
) -> Result<Document, AppError> {
    let document = sqlx::query_as::<_, Document>(
        r#"
        INSERT INTO documents (user_id, title, content, content_type, file_path)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, title, content, content_type, file_path, summary, created_at
        "#,
    )
    .bind(user_id)
    .bind(title)
    .bind(content)
    .bind(content_type)
    .bind(file_path)
    .fetch_one(pool)
    .await?;

    Ok(document)
}

/// Fire-and-forget hand-off to the summarization worker. A full or closed
/// queue only costs the summary, never the upload.
fn enqueue_summary(summary_tx: &mpsc::Sender<SummaryJob>, document_id: i64) {
    if let Err(e) = summary_tx.try_send(SummaryJob { document_id }) {
        tracing::warn!(document_id, "summary queue unavailable: {}", e);
    }
}

/// Uploads a text document (multipart fields: 'title', 'file').
///
/// PDFs are extracted, text files decoded, anything else stored as a
/// placeholder. Summarization is queued in the background.
#[utoipa::path(
    post,
    path = "/api/documents/text",
    responses(
        (status = 201, description = "Document created", body = DocumentResponse),
        (status = 400, description = "Malformed multipart payload"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "documents"
)]
pub async fn create_text_document(
    State(pool): State<PgPool>,
    State(summary_tx): State<mpsc::Sender<SummaryJob>>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let user_id: i64 = claims
        .sub
        .parse()
        .map_err(|_| AppError::AuthError("Invalid user ID in token".to_string()))?;

    let (title, file) = read_title_and_file(multipart, "file").await?;
    let content =
        ingest::text_from_upload(&file.file_name, file.content_type.as_deref(), &file.bytes);

    let document = insert_document(&pool, user_id, &title, Some(&content), "text", None).await?;
    enqueue_summary(&summary_tx, document.id);

    Ok((StatusCode::CREATED, Json(DocumentResponse::from(document))))
}

/// Uploads an image document (multipart fields: 'title', 'image'). The image
/// is stored inline as base64.
#[utoipa::path(
    post,
    path = "/api/documents/image",
    responses(
        (status = 201, description = "Document created", body = DocumentResponse),
        (status = 400, description = "Malformed multipart payload"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "documents"
)]
pub async fn create_image_document(
    State(pool): State<PgPool>,
    State(summary_tx): State<mpsc::Sender<SummaryJob>>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let user_id: i64 = claims
        .sub
        .parse()
        .map_err(|_| AppError::AuthError("Invalid user ID in token".to_string()))?;

    let (title, file) = read_title_and_file(multipart, "image").await?;
    let content = ingest::encode_image(&file.bytes);

    let document = insert_document(&pool, user_id, &title, Some(&content), "image", None).await?;
    enqueue_summary(&summary_tx, document.id);

    Ok((StatusCode::CREATED, Json(DocumentResponse::from(document))))
}

/// Uploads a raw file (multipart fields: 'title', 'file'). The payload goes
/// to disk untouched; the background worker reads it back before
/// summarizing.
#[utoipa::path(
    post,
    path = "/api/documents/file",
    responses(
        (status = 201, description = "Document created", body = DocumentResponse),
        (status = 400, description = "Malformed multipart payload"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "documents"
)]
pub async fn create_file_document(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    State(summary_tx): State<mpsc::Sender<SummaryJob>>,
    Extension(claims): Extension<Claims>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let user_id: i64 = claims
        .sub
        .parse()
        .map_err(|_| AppError::AuthError("Invalid user ID in token".to_string()))?;

    let (title, file) = read_title_and_file(multipart, "file").await?;
    let file_path = ingest::store_upload(&config.upload_dir, &file.file_name, &file.bytes).await?;

    let document =
        insert_document(&pool, user_id, &title, None, "file", Some(&file_path)).await?;
    enqueue_summary(&summary_tx, document.id);

    Ok((StatusCode::CREATED, Json(DocumentResponse::from(document))))
}

/// Lists the caller's documents, newest first.
#[utoipa::path(
    get,
    path = "/api/documents",
    responses(
        (status = 200, description = "Documents owned by the caller", body = [DocumentResponse]),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "documents"
)]
pub async fn list_documents(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id: i64 = claims
        .sub
        .parse()
        .map_err(|_| AppError::AuthError("Invalid user ID in token".to_string()))?;

    let documents = sqlx::query_as::<_, Document>(
        r#"
        SELECT id, user_id, title, content, content_type, file_path, summary, created_at
        FROM documents
        WHERE user_id = $1
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    let documents: Vec<DocumentResponse> =
        documents.into_iter().map(DocumentResponse::from).collect();

    Ok(Json(documents))
}

/// Fetches a single document by id.
#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    params(("id" = i64, Path, description = "Document id")),
    responses(
        (status = 200, description = "The document", body = DocumentResponse),
        (status = 404, description = "No such document")
    ),
    tag = "documents"
)]
pub async fn get_document(
    State(pool): State<PgPool>,
    Path(document_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let document = sqlx::query_as::<_, Document>(
        r#"
        SELECT id, user_id, title, content, content_type, file_path, summary, created_at
        FROM documents
        WHERE id = $1
        "#,
    )
    .bind(document_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Document not found".to_string()))?;

    Ok(Json(DocumentResponse::from(document)))
}

/// Returns the document with its summary, generating and storing one on the
/// spot when the background pass has not filled it in yet.
#[utoipa::path(
    post,
    path = "/api/documents/{id}/summary",
    params(("id" = i64, Path, description = "Document id")),
    responses(
        (status = 200, description = "The document including its summary", body = DocumentResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No such document for this user")
    ),
    security(("bearer_auth" = [])),
    tag = "documents"
)]
pub async fn request_summary(
    State(pool): State<PgPool>,
    State(ai): State<AiClient>,
    Path(document_id): Path<i64>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id: i64 = claims
        .sub
        .parse()
        .map_err(|_| AppError::AuthError("Invalid user ID in token".to_string()))?;

    let mut document = sqlx::query_as::<_, Document>(
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

    if document.summary.is_none() {
        let summary = ai.summarize(&document).await;
        sqlx::query("UPDATE documents SET summary = $1 WHERE id = $2")
            .bind(&summary)
            .bind(document_id)
            .execute(&pool)
            .await?;
        document.summary = Some(summary);
    }

    Ok(Json(DocumentResponse::from(document)))
}

/// Answers a question about a document. Exact repeats are served from the
/// stored Q&A history without another provider round trip.
#[utoipa::path(
    post,
    path = "/api/documents/{id}/question",
    params(("id" = i64, Path, description = "Document id")),
    request_body = AskQuestionRequest,
    responses(
        (status = 200, description = "The answer", body = QuestionResponse),
        (status = 400, description = "Document has no content"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "No such document for this user")
    ),
    security(("bearer_auth" = [])),
    tag = "documents"
)]
pub async fn ask_question(
    State(pool): State<PgPool>,
    State(ai): State<AiClient>,
    Path(document_id): Path<i64>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AskQuestionRequest>,
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

    if document.content.as_deref().unwrap_or("").is_empty() && document.file_path.is_none() {
        return Err(AppError::BadRequest(
            "Document has no content to answer questions from".to_string(),
        ));
    }

    let existing = sqlx::query_as::<_, DocumentQuestion>(
        r#"
        SELECT id, document_id, question_text, answer, created_at
        FROM document_questions
        WHERE document_id = $1 AND question_text = $2
        ORDER BY id
        LIMIT 1
        "#,
    )
    .bind(document_id)
    .bind(&payload.question)
    .fetch_optional(&pool)
    .await?;

    if let Some(question) = existing {
        return Ok(Json(QuestionResponse::from(question)));
    }

    let answer = ai.answer_question(&document, &payload.question).await;

    let question = sqlx::query_as::<_, DocumentQuestion>(
        r#"
        INSERT INTO document_questions (document_id, question_text, answer)
        VALUES ($1, $2, $3)
        RETURNING id, document_id, question_text, answer, created_at
        "#,
    )
    .bind(document_id)
    .bind(&payload.question)
    .bind(&answer)
    .fetch_one(&pool)
    .await?;

    Ok(Json(QuestionResponse::from(question)))
}
