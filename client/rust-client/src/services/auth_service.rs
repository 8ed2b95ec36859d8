use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use validator::Validate;

use crate::models::{AuthResponse, LoginRequest, RegisterRequest, RegisterResponse, UserInfo};
use crate::services::token_store::{StoredSession, TokenStore};
use crate::services::AppState;

const REGISTER_PATH: &str = "/api/auth/register";
const LOGIN_PATH: &str = "/api/auth/login";
const LOGOUT_PATH: &str = "/api/auth/logout";

pub struct AuthService {
    http: Client,
    base_url: String,
    tokens: Arc<TokenStore>,
}

impl AuthService {
    pub fn new(state: &AppState) -> Self {
        Self {
            http: state.http.clone(),
            base_url: state.config.api_base_url.clone(),
            tokens: Arc::clone(&state.tokens),
        }
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<RegisterResponse> {
        req.validate().context("Invalid registration data")?;

        let url = format!("{}{}", self.base_url, REGISTER_PATH);
        let response = self
            .http
            .post(&url)
            .json(req)
            .send()
            .await
            .context("Failed to call register API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("Register API returned error {}: {}", status, error_text));
        }

        let registered: RegisterResponse = response
            .json()
            .await
            .context("Failed to parse register response")?;

        tracing::info!("Registered user: {}", registered.username);
        Ok(registered)
    }

    /// Logs in and persists the returned token pair. When the backend omits
    /// the user object a minimal local record is stored instead.
    pub async fn login(&self, req: &LoginRequest) -> Result<UserInfo> {
        let url = format!("{}{}", self.base_url, LOGIN_PATH);
        let response = self
            .http
            .post(&url)
            .json(req)
            .send()
            .await
            .context("Failed to call login API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("Login API returned error {}: {}", status, error_text));
        }

        let auth: AuthResponse = response
            .json()
            .await
            .context("Failed to parse login response")?;

        let user = auth
            .user
            .map(|mut user| {
                user.role.get_or_insert_with(|| "player".to_string());
                user
            })
            .unwrap_or_else(|| UserInfo {
                id: 0,
                username: req.username.clone(),
                email: String::new(),
                role: Some("player".to_string()),
            });

        self.tokens.set(StoredSession {
            access: auth.access,
            refresh: auth.refresh,
            user: Some(user.clone()),
        })?;

        tracing::info!("Logged in as {}", user.username);
        Ok(user)
    }

    /// Tells the backend and clears the persisted session. The local session
    /// is removed even when the server call fails.
    pub async fn logout(&self) -> Result<()> {
        let url = format!("{}{}", self.base_url, LOGOUT_PATH);
        let mut request = self.http.post(&url);
        if let Some(token) = self.tokens.access_token() {
            request = request.bearer_auth(token);
        }

        let result = request.send().await;
        self.tokens.clear();

        if let Err(e) = result {
            tracing::warn!("Logout request failed (session cleared locally): {}", e);
        }
        Ok(())
    }

    pub fn current_user(&self) -> Option<UserInfo> {
        self.tokens.user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.is_authenticated()
    }
}
