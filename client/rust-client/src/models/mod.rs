pub mod answer;
pub mod puzzle;
pub mod stats;
pub mod user;

pub use answer::{Judgment, SubmitAnswerRequest};
pub use puzzle::{Difficulty, Puzzle};
pub use stats::SessionStats;
pub use user::{
    AuthResponse, GameHistory, LeaderboardEntry, LoginRequest, ProfileData, RegisterRequest,
    RegisterResponse, UserInfo,
};
