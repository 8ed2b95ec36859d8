use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 32))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Token pair returned on login. The user object is optional on the wire;
/// callers fall back to a minimal local record when it is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access: String,
    pub refresh: String,
    #[serde(default)]
    pub user: Option<UserInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameHistory {
    pub puzzle_id: String,
    pub correct: bool,
    pub points: u32,
    pub time_taken: u32,
    #[serde(default)]
    pub difficulty: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileData {
    pub username: String,
    pub email: String,
    pub score: u64,
    pub games_played: u32,
    pub accuracy: f64,
    pub recent_games: Vec<GameHistory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub username: String,
    pub score: u64,
}
