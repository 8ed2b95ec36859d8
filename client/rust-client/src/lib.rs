#![allow(dead_code)]

pub mod config;
pub mod models;
pub mod round;
pub mod services;

pub use config::Config;
pub use round::{
    AnswerJudge, Clock, PuzzleSource, Resolution, RoundController, RoundFault, RoundNotice,
    RoundPhase, RoundSnapshot, SystemClock,
};
pub use services::AppState;
