//! The round controller: one puzzle's lifecycle from fetch to resolution.
//!
//! `machine` holds the synchronous state machine, `controller` the async
//! driver that feeds it events one at a time, `clock` the tick source.

pub mod clock;
pub mod controller;
pub mod machine;

pub use clock::{Clock, SystemClock};
pub use controller::{AnswerJudge, PuzzleSource, RoundController};
pub use machine::{
    RejectReason, Resolution, RoundFault, RoundNotice, RoundPhase, RoundSnapshot,
};
