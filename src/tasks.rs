// src/tasks.rs

use sqlx::PgPool;
use tokio::sync::mpsc;

use crate::ai::AiClient;
use crate::ingest;
use crate::models::document::Document;

/// Queued request to summarize one document.
#[derive(Debug, Clone)]
pub struct SummaryJob {
    pub document_id: i64,
}

const QUEUE_CAPACITY: usize = 64;

/// Spawns the background summarization worker and returns the sender side of
/// its queue. The worker owns its pool and client clones and runs until the
/// last sender is dropped.
pub fn spawn_summary_worker(pool: PgPool, ai: AiClient) -> mpsc::Sender<SummaryJob> {
    let (tx, mut rx) = mpsc::channel::<SummaryJob>(QUEUE_CAPACITY);

    tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            if let Err(e) = summarize_document(&pool, &ai, job.document_id).await {
                tracing::error!(
                    document_id = job.document_id,
                    "summarization job failed: {}",
                    e
                );
            }
        }
        tracing::info!("summary worker shutting down");
    });

    tx
}

/// One job end to end: hydrate file-backed content if it has not been read
/// yet, generate the summary and store it on the document row.
async fn summarize_document(pool: &PgPool, ai: &AiClient, document_id: i64) -> Result<(), sqlx::Error> {
    let document = sqlx::query_as::<_, Document>(
        "SELECT id, user_id, title, content, content_type, file_path, summary, created_at FROM documents WHERE id = $1",
    )
    .bind(document_id)
    .fetch_optional(pool)
    .await?;

    let mut document = match document {
        Some(doc) => doc,
        None => {
            tracing::warn!(document_id, "document vanished before summarization");
            return Ok(());
        }
    };

    if document.content_type == "file" && document.content.is_none() {
        if let Some(path) = document.file_path.clone() {
            match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    let content = ingest::decode_file_bytes(&bytes);
                    sqlx::query("UPDATE documents SET content = $1 WHERE id = $2")
                        .bind(&content)
                        .bind(document_id)
                        .execute(pool)
                        .await?;
                    document.content = Some(content);
                }
                Err(e) => {
                    // Keep going: the prompt builder has a placeholder for
                    // missing file content.
                    tracing::error!(document_id, "failed to read stored upload: {}", e);
                }
            }
        }
    }

    let summary = ai.summarize(&document).await;

    sqlx::query("UPDATE documents SET summary = $1 WHERE id = $2")
        .bind(&summary)
        .bind(document_id)
        .execute(pool)
        .await?;

    tracing::info!(document_id, "summary stored");

    Ok(())
}
