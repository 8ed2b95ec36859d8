use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;

use crate::models::{GameHistory, LeaderboardEntry, ProfileData};
use crate::services::token_store::TokenStore;
use crate::services::AppState;

const PROFILE_PATH: &str = "/api/profile";
const HISTORY_PATH: &str = "/api/profile/history";
const LEADERBOARD_PATH: &str = "/api/leaderboard";

pub struct ProfileService {
    http: Client,
    base_url: String,
    tokens: Arc<TokenStore>,
}

impl ProfileService {
    pub fn new(state: &AppState) -> Self {
        Self {
            http: state.http.clone(),
            base_url: state.config.api_base_url.clone(),
            tokens: Arc::clone(&state.tokens),
        }
    }

    pub async fn get_profile(&self) -> Result<ProfileData> {
        self.get_json(PROFILE_PATH, "profile").await
    }

    pub async fn get_history(&self) -> Result<Vec<GameHistory>> {
        self.get_json(HISTORY_PATH, "history").await
    }

    pub async fn get_leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        self.get_json(LEADERBOARD_PATH, "leaderboard").await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str, what: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.get(&url);
        if let Some(token) = self.tokens.access_token() {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to call {} API", what))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!(
                "{} API returned error {}: {}",
                what,
                status,
                error_text
            ));
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", what))
    }
}
