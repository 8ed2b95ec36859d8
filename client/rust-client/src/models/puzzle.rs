use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Countdown length used when the backend does not send a time limit.
    pub fn default_time_limit(&self) -> u32 {
        match self {
            Difficulty::Easy => 60,
            Difficulty::Medium => 45,
            Difficulty::Hard => 30,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// One picture puzzle as served by the backend. Immutable once fetched;
/// the next round replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Puzzle {
    pub puzzle_id: String,
    pub image_url: String,
    pub difficulty: Difficulty,
    pub points_value: u32,
    #[serde(default)]
    pub time_limit: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Puzzle {
    /// Time limit in whole seconds, falling back to the difficulty default
    /// when the backend omits it or sends zero.
    pub fn effective_time_limit(&self) -> u32 {
        self.time_limit
            .filter(|limit| *limit > 0)
            .unwrap_or_else(|| self.difficulty.default_time_limit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_payload() {
        let json = r#"{
            "puzzle_id": "abc-123",
            "image_url": "https://cdn.example/banana.png",
            "difficulty": "medium",
            "points_value": 10,
            "time_limit": 45,
            "created_at": "2024-05-01T12:00:00Z"
        }"#;

        let puzzle: Puzzle = serde_json::from_str(json).unwrap();
        assert_eq!(puzzle.puzzle_id, "abc-123");
        assert_eq!(puzzle.difficulty, Difficulty::Medium);
        assert_eq!(puzzle.effective_time_limit(), 45);
    }

    #[test]
    fn missing_time_limit_falls_back_to_difficulty_default() {
        let json = r#"{
            "puzzle_id": "p1",
            "image_url": "",
            "difficulty": "hard",
            "points_value": 20
        }"#;

        let puzzle: Puzzle = serde_json::from_str(json).unwrap();
        assert_eq!(puzzle.time_limit, None);
        assert_eq!(puzzle.effective_time_limit(), 30);
    }

    #[test]
    fn zero_time_limit_falls_back_to_difficulty_default() {
        let puzzle = Puzzle {
            puzzle_id: "p2".to_string(),
            image_url: String::new(),
            difficulty: Difficulty::Easy,
            points_value: 5,
            time_limit: Some(0),
            created_at: None,
        };
        assert_eq!(puzzle.effective_time_limit(), 60);
    }
}
