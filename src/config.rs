// src/config.rs

use std::env;
use dotenvy::dotenv;
use url::Url;

/// Questions requested from the generator when the client does not say how many.
pub const DEFAULT_QUIZ_QUESTIONS: u32 = 15;

/// Options per generated multiple-choice question.
pub const QUIZ_OPTION_COUNT: usize = 4;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub ai_api_url: String,
    pub ai_api_key: String,
    pub ai_model: String,
    pub ai_timeout_secs: u64,
    pub upload_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1800);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let ai_api_url = env::var("AI_API_URL")
            .unwrap_or_else(|_| "https://openrouter.ai/api/v1/chat/completions".to_string());
        Url::parse(&ai_api_url).expect("AI_API_URL must be a valid URL");

        // Missing key is tolerated: generation degrades to fallbacks instead of
        // refusing to start.
        let ai_api_key = env::var("AI_API_KEY").unwrap_or_default();

        let ai_model = env::var("AI_MODEL")
            .unwrap_or_else(|_| "deepseek/deepseek-chat-v3-0324:free".to_string());

        let ai_timeout_secs = env::var("AI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let upload_dir = env::var("UPLOAD_DIR")
            .unwrap_or_else(|_| "uploads".to_string());

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            ai_api_url,
            ai_api_key,
            ai_model,
            ai_timeout_secs,
            upload_dir,
        }
    }
}
