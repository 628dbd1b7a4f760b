// src/ai/mod.rs

pub mod quiz_gen;

use std::fmt;
use std::time::Duration;

use reqwest::{Client, StatusCode, header};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::models::document::Document;

const SUMMARY_SYSTEM: &str = "You are a helpful assistant that generates concise summaries.";
const ANSWER_SYSTEM: &str =
    "You are a helpful assistant that provides accurate answers based on the given content.";

/// Chat-completions wire format shared by OpenRouter-compatible providers.
#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Failure inside the gateway. Callers never see this directly: every public
/// entry point converts it into degraded output instead of an HTTP error.
#[derive(Debug)]
pub enum AiError {
    Http(reqwest::Error),
    BadStatus(StatusCode),
    EmptyResponse,
}

impl fmt::Display for AiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiError::Http(e) => write!(f, "request failed: {}", e),
            AiError::BadStatus(status) => write!(f, "provider returned status {}", status),
            AiError::EmptyResponse => write!(f, "response contained no choices"),
        }
    }
}

impl std::error::Error for AiError {}

/// Thin client over the chat-completions endpoint. Cloning is cheap, the
/// inner reqwest client is shared.
#[derive(Clone)]
pub struct AiClient {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl AiClient {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.ai_timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            api_url: config.ai_api_url.clone(),
            api_key: config.ai_api_key.clone(),
            model: config.ai_model.clone(),
        }
    }

    /// One round trip to the provider. Returns the first choice's content.
    async fn chat(&self, system: &str, user: &str, temperature: f32) -> Result<String, AiError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature,
        };

        let response = self
            .client
            .post(&self.api_url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(AiError::Http)?;

        if !response.status().is_success() {
            return Err(AiError::BadStatus(response.status()));
        }

        let chat: ChatResponse = response.json().await.map_err(AiError::Http)?;

        chat.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(AiError::EmptyResponse)
    }

    /// What of the document goes into a prompt. Base64 image payloads are
    /// never sent upstream, only a placeholder.
    fn prompt_content(document: &Document) -> String {
        match document.content_type.as_str() {
            "image" => "Image content: [Base64 encoded image]".to_string(),
            "file" => document
                .content
                .clone()
                .unwrap_or_else(|| "File content".to_string()),
            _ => document.content.clone().unwrap_or_default(),
        }
    }

    /// Summarizes a document. Never fails: on any provider error the returned
    /// string describes the failure and is stored as the summary.
    pub async fn summarize(&self, document: &Document) -> String {
        let content = Self::prompt_content(document);
        let prompt = format!(
            "Generate a comprehensive summary of the following content:\n\n{}",
            content
        );

        match self.chat(SUMMARY_SYSTEM, &prompt, 0.3).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::error!(document_id = document.id, "summary generation failed: {}", e);
                format!("Failed to generate summary: {}", e)
            }
        }
    }

    /// Answers a free-form question against the document content. Same
    /// degradation policy as `summarize`.
    pub async fn answer_question(&self, document: &Document, question: &str) -> String {
        let content = document
            .content
            .as_deref()
            .unwrap_or("No content available");
        let prompt = format!(
            "Based on the following document content, answer the question:\n\n\
             Document Title: {}\n\
             Content:\n{}\n\n\
             Question: {}\n\n\
             Please provide a clear and concise answer.",
            document.title, content, question
        );

        match self.chat(ANSWER_SYSTEM, &prompt, 0.3).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::error!(document_id = document.id, "answer generation failed: {}", e);
                format!("Failed to generate answer: {}", e)
            }
        }
    }
}
