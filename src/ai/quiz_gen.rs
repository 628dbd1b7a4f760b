// src/ai/quiz_gen.rs

use serde::{Deserialize, Serialize};

use super::AiClient;
use crate::config::QUIZ_OPTION_COUNT;
use crate::models::document::Document;
use crate::models::quiz::{QuizOptionInput, QuizQuestionInput};

const QUIZ_SYSTEM: &str = "You are a helpful assistant that generates high-quality quiz questions.";

/// One generated multiple-choice question as decoded from the model output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub question: String,
    pub options: Vec<GeneratedOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedOption {
    pub text: String,
    pub is_correct: bool,
}

impl From<GeneratedQuestion> for QuizQuestionInput {
    fn from(q: GeneratedQuestion) -> Self {
        Self {
            question_text: q.question,
            options: q
                .options
                .into_iter()
                .map(|opt| QuizOptionInput {
                    option_text: opt.text,
                    is_correct: opt.is_correct,
                })
                .collect(),
        }
    }
}

impl AiClient {
    /// Generates `count` multiple-choice questions for a document.
    ///
    /// Infallible by contract: provider errors, malformed output and
    /// rule-breaking questions (wrong option count, zero or several correct
    /// flags) all fall back to a deterministic sample quiz, so quiz creation
    /// stays available when generation is not.
    pub async fn generate_quiz(&self, document: &Document, count: u32) -> Vec<GeneratedQuestion> {
        let content = Self::prompt_content(document);
        let prompt = build_quiz_prompt(&content, count);

        let text = match self.chat(QUIZ_SYSTEM, &prompt, 0.7).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    document_id = document.id,
                    "quiz generation failed, using fallback: {}",
                    e
                );
                return fallback_quiz(count);
            }
        };

        match parse_generated(&text) {
            Some(questions) => questions,
            None => {
                tracing::warn!(
                    document_id = document.id,
                    "generated quiz did not validate, using fallback"
                );
                fallback_quiz(count)
            }
        }
    }
}

fn build_quiz_prompt(content: &str, count: u32) -> String {
    format!(
        "Based on the following content, generate {} multiple-choice quiz questions.\n\n\
         Content: {}\n\n\
         For each question:\n\
         1. Create a clear question\n\
         2. Provide 4 answer options (A, B, C, D)\n\
         3. Mark exactly one option as correct\n\n\
         Format your response as a JSON array with the following structure:\n\
         [\n\
             {{\n\
                 \"question\": \"Question text\",\n\
                 \"options\": [\n\
                     {{\"text\": \"Option A text\", \"is_correct\": true}},\n\
                     {{\"text\": \"Option B text\", \"is_correct\": false}},\n\
                     {{\"text\": \"Option C text\", \"is_correct\": false}},\n\
                     {{\"text\": \"Option D text\", \"is_correct\": false}}\n\
                 ]\n\
             }},\n\
             ... more questions ...\n\
         ]",
        count, content
    )
}

/// Slices the first top-level JSON array out of a model response. Models
/// routinely wrap the payload in prose or markdown fences.
pub(crate) fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

fn is_well_formed(question: &GeneratedQuestion) -> bool {
    question.options.len() == QUIZ_OPTION_COUNT
        && !question.question.trim().is_empty()
        && question.options.iter().all(|opt| !opt.text.trim().is_empty())
        && question.options.iter().filter(|opt| opt.is_correct).count() == 1
}

/// Typed decode plus validation of a raw model response. `None` means the
/// caller should fall back.
pub(crate) fn parse_generated(text: &str) -> Option<Vec<GeneratedQuestion>> {
    let slice = extract_json_array(text)?;
    let questions: Vec<GeneratedQuestion> = serde_json::from_str(slice).ok()?;

    if questions.is_empty() || !questions.iter().all(is_well_formed) {
        return None;
    }

    Some(questions)
}

/// Deterministic stand-in quiz. Question `i` has four options labelled A to D
/// with the correct one rotating by `i % 4`, so every question keeps exactly
/// one correct option.
pub fn fallback_quiz(count: u32) -> Vec<GeneratedQuestion> {
    (1..=count)
        .map(|i| GeneratedQuestion {
            question: format!("Sample question {}?", i),
            options: vec![
                GeneratedOption {
                    text: "Option A".to_string(),
                    is_correct: i % 4 == 0,
                },
                GeneratedOption {
                    text: "Option B".to_string(),
                    is_correct: i % 4 == 1,
                },
                GeneratedOption {
                    text: "Option C".to_string(),
                    is_correct: i % 4 == 2,
                },
                GeneratedOption {
                    text: "Option D".to_string(),
                    is_correct: i % 4 == 3,
                },
            ],
        })
        .collect()
}
