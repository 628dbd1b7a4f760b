// src/models/document.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Represents the 'documents' table in the database.
///
/// `content` is the extracted or supplied text; for image uploads it holds the
/// base64 payload and for raw file uploads it stays NULL until the background
/// worker has read the file back in.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,

    pub user_id: i64,

    pub title: String,

    pub content: Option<String>,

    /// One of 'text', 'image' or 'file'; steers prompt construction.
    pub content_type: String,

    /// Where the stored upload lives on disk, for 'file' documents.
    pub file_path: Option<String>,

    /// Generated summary, filled in asynchronously after upload.
    pub summary: Option<String>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Client-facing view of a document. Raw content and storage paths stay
/// server-side.
#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentResponse {
    pub id: i64,
    pub title: String,
    pub content_type: String,
    pub summary: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            title: doc.title,
            content_type: doc.content_type,
            summary: doc.summary,
            created_at: doc.created_at,
        }
    }
}

/// Represents the 'document_questions' table: the Q&A history of a document.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DocumentQuestion {
    pub id: i64,
    pub document_id: i64,
    pub question_text: String,
    pub answer: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for asking a question about a document.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AskQuestionRequest {
    #[validate(length(min = 1, max = 2000, message = "Question must not be empty."))]
    pub question: String,
}

/// Answer to a document question, either freshly generated or replayed from
/// the history.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionResponse {
    pub id: i64,
    pub question_text: String,
    pub answer: String,
}

impl From<DocumentQuestion> for QuestionResponse {
    fn from(q: DocumentQuestion) -> Self {
        Self {
            id: q.id,
            question_text: q.question_text,
            answer: q.answer,
        }
    }
}
