// src/ingest.rs

use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use uuid::Uuid;

use crate::error::AppError;

/// Pulls the text out of a PDF, page by page in page order.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, lopdf::Error> {
    let doc = lopdf::Document::load_mem(bytes)?;

    let mut text = String::new();
    for page_number in doc.get_pages().keys() {
        text.push_str(&doc.extract_text(&[*page_number])?);
        text.push('\n');
    }

    Ok(text)
}

/// Turns an uploaded file into document text.
///
/// PDFs get real extraction, text/* payloads are decoded lossily, anything
/// else is stored as a named placeholder. Extraction failure degrades to a
/// placeholder carrying the reason instead of failing the upload.
pub fn text_from_upload(filename: &str, content_type: Option<&str>, bytes: &[u8]) -> String {
    if filename.to_lowercase().ends_with(".pdf") {
        match extract_pdf_text(bytes) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(filename, "pdf extraction failed: {}", e);
                format!("PDF content could not be extracted: {}", e)
            }
        }
    } else if content_type.is_some_and(|ct| ct.starts_with("text/")) {
        String::from_utf8_lossy(bytes).into_owned()
    } else {
        format!("File content from {}", filename)
    }
}

/// Image uploads are stored inline as base64 text.
pub fn encode_image(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Stored-file bytes back to text for prompting. Non-UTF-8 payloads become a
/// fixed marker rather than garbage.
pub fn decode_file_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => "Binary file content".to_string(),
    }
}

/// Writes an upload into the uploads directory under a fresh UUID name,
/// keeping the original extension. Returns the path stored on the document
/// row.
pub async fn store_upload(
    upload_dir: &str,
    original_name: &str,
    bytes: &[u8],
) -> Result<String, AppError> {
    tokio::fs::create_dir_all(upload_dir).await?;

    let extension = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default();
    let unique_name = format!("{}{}", Uuid::new_v4(), extension);

    let path = Path::new(upload_dir).join(unique_name);
    tokio::fs::write(&path, bytes).await?;

    Ok(path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_upload_is_decoded() {
        let text = text_from_upload("notes.txt", Some("text/plain"), b"hello world");
        assert_eq!(text, "hello world");
    }

    #[test]
    fn unknown_binary_becomes_named_placeholder() {
        let text = text_from_upload("report.docx", Some("application/octet-stream"), &[0, 1, 2]);
        assert_eq!(text, "File content from report.docx");
    }

    #[test]
    fn broken_pdf_degrades_to_placeholder() {
        let text = text_from_upload("broken.pdf", Some("application/pdf"), b"not a pdf");
        assert!(text.starts_with("PDF content could not be extracted:"));
    }

    #[test]
    fn pdf_detection_ignores_filename_case() {
        let text = text_from_upload("REPORT.PDF", Some("application/pdf"), b"not a pdf");
        assert!(text.starts_with("PDF content could not be extracted:"));
    }

    #[test]
    fn file_bytes_decode_or_fall_back() {
        assert_eq!(decode_file_bytes(b"plain text"), "plain text");
        assert_eq!(decode_file_bytes(&[0xff, 0xfe, 0x00]), "Binary file content");
    }

    #[test]
    fn image_encoding_is_standard_base64() {
        assert_eq!(encode_image(b"abc"), "YWJj");
    }

    #[tokio::test]
    async fn store_upload_keeps_extension_and_content() {
        let dir = std::env::temp_dir().join(format!("uploads-test-{}", Uuid::new_v4()));
        let dir = dir.to_string_lossy().into_owned();

        let path = store_upload(&dir, "paper.pdf", b"%PDF-").await.unwrap();
        assert!(path.ends_with(".pdf"));

        let stored = tokio::fs::read(&path).await.unwrap();
        assert_eq!(stored, b"%PDF-");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
