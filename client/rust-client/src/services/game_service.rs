use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use crate::models::{Judgment, Puzzle, SubmitAnswerRequest};
use crate::round::{AnswerJudge, PuzzleSource};
use crate::services::token_store::TokenStore;
use crate::services::AppState;

const GET_QUESTION_PATH: &str = "/api/game/question";
const SUBMIT_ANSWER_PATH: &str = "/api/game/checkanswer";

/// REST implementation of the controller's two collaborators: the puzzle
/// source and the answer judge.
pub struct GameService {
    http: Client,
    base_url: String,
    tokens: Arc<TokenStore>,
}

impl GameService {
    pub fn new(state: &AppState) -> Self {
        Self {
            http: state.http.clone(),
            base_url: state.config.api_base_url.clone(),
            tokens: Arc::clone(&state.tokens),
        }
    }

    pub async fn get_question(&self) -> Result<Puzzle> {
        let url = format!("{}{}", self.base_url, GET_QUESTION_PATH);
        tracing::debug!("Fetching puzzle from {}", url);

        let mut request = self.http.get(&url);
        if let Some(token) = self.tokens.access_token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.context("Failed to call puzzle API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("Puzzle API returned error {}: {}", status, error_text));
        }

        let puzzle: Puzzle = response
            .json()
            .await
            .context("Failed to parse puzzle response")?;

        tracing::info!(
            "Fetched puzzle {} (difficulty={})",
            puzzle.puzzle_id,
            puzzle.difficulty.as_str()
        );
        Ok(puzzle)
    }

    pub async fn submit_answer(&self, puzzle_id: &str, answer: &str) -> Result<Judgment> {
        let url = format!("{}{}", self.base_url, SUBMIT_ANSWER_PATH);
        let payload = SubmitAnswerRequest {
            puzzle_id: puzzle_id.to_string(),
            answer: answer.to_string(),
        };

        let mut request = self.http.post(&url).json(&payload);
        if let Some(token) = self.tokens.access_token() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.context("Failed to call answer API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow!("Answer API returned error {}: {}", status, error_text));
        }

        let judgment: Judgment = response
            .json()
            .await
            .context("Failed to parse judgment response")?;

        tracing::info!(
            "Answer judged: puzzle={}, correct={}, new_score={}",
            puzzle_id,
            judgment.correct,
            judgment.new_score
        );
        Ok(judgment)
    }
}

#[async_trait]
impl PuzzleSource for GameService {
    async fn fetch_puzzle(&self) -> Result<Puzzle> {
        self.get_question().await
    }
}

#[async_trait]
impl AnswerJudge for GameService {
    async fn judge(&self, puzzle_id: &str, answer: &str) -> Result<Judgment> {
        self.submit_answer(puzzle_id, answer).await
    }
}
