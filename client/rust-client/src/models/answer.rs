use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct SubmitAnswerRequest {
    pub puzzle_id: String,
    pub answer: String,
}

/// Verdict returned by the backend for a submitted answer. `new_score` is the
/// authoritative running total and replaces the client-side score outright.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Judgment {
    pub correct: bool,
    pub points_awarded: u32,
    pub new_score: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_request_matches_wire_format() {
        let req = SubmitAnswerRequest {
            puzzle_id: "abc-123".to_string(),
            answer: "plantain".to_string(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "puzzle_id": "abc-123", "answer": "plantain" })
        );
    }

    #[test]
    fn parses_judgment_payload() {
        let json = r#"{ "correct": true, "points_awarded": 10, "new_score": 120 }"#;
        let judgment: Judgment = serde_json::from_str(json).unwrap();
        assert!(judgment.correct);
        assert_eq!(judgment.points_awarded, 10);
        assert_eq!(judgment.new_score, 120);
    }
}
