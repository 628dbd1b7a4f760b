// src/state.rs

use axum::extract::FromRef;
use sqlx::PgPool;
use tokio::sync::mpsc;

use crate::ai::AiClient;
use crate::config::Config;
use crate::tasks::SummaryJob;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub ai: AiClient,
    pub summary_tx: mpsc::Sender<SummaryJob>,
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for AiClient {
    fn from_ref(state: &AppState) -> Self {
        state.ai.clone()
    }
}

impl FromRef<AppState> for mpsc::Sender<SummaryJob> {
    fn from_ref(state: &AppState) -> Self {
        state.summary_tx.clone()
    }
}
