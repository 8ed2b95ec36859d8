use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::services::token_store::TokenStore;

/// Shared client state: configuration, the persisted session, and one
/// reqwest client reused by every service.
pub struct AppState {
    pub config: Config,
    pub tokens: Arc<TokenStore>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let tokens = Arc::new(TokenStore::open(&config.session_file));
        if tokens.is_authenticated() {
            tracing::info!("Restored persisted session from {}", config.session_file);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            config,
            tokens,
            http,
        })
    }
}

pub mod auth_service;
pub mod game_service;
pub mod profile_service;
pub mod token_store;
