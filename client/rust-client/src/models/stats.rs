use serde::{Deserialize, Serialize};

/// Cumulative per-session counters. Owned exclusively by the round
/// controller; everything except the streak is monotonic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub correct: u32,
    pub wrong: u32,
    pub streak: u32,
    pub score: u64,
}

impl SessionStats {
    /// Records a judged-correct resolution. The score is set to the backend's
    /// new total, not summed locally.
    pub fn record_correct(&mut self, new_total: u64) {
        self.correct += 1;
        self.streak += 1;
        self.score = new_total;
    }

    /// Records any non-correct resolution (wrong answer or timeout).
    pub fn record_miss(&mut self) {
        self.wrong += 1;
        self.streak = 0;
    }
}
