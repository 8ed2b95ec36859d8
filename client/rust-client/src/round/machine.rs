use serde::Serialize;
use thiserror::Error;

use crate::models::{Judgment, Puzzle, SessionStats};

/// Lifecycle phase of the controller. The machine loops
/// `Loading -> Active -> Resolving -> Loading`; there is no terminal phase,
/// teardown happens outside the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    Idle,
    Loading,
    Active,
    Resolving,
}

/// Inputs to the machine. Completions carry the sequence number of the
/// request they answer; anything from a superseded generation is discarded.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundEvent {
    Start,
    Tick { seq: u64 },
    Submit { answer: String },
    PuzzleReady { seq: u64, puzzle: Puzzle },
    PuzzleFailed { seq: u64 },
    Judged { seq: u64, judgment: Judgment },
    JudgeFailed { seq: u64 },
}

/// Side effects requested by a transition, applied by the async driver in
/// the order emitted.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchPuzzle { seq: u64 },
    JudgeAnswer { seq: u64, puzzle_id: String, answer: String },
    StartTicker { seq: u64 },
    StopTicker,
    Notify(RoundNotice),
}

/// How the active round ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Correct { points_awarded: u32, new_score: u64 },
    Incorrect,
    Timeout,
}

/// Why a submit call was refused without consuming the round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NotActive,
    TimeExpired,
    AlreadySubmitting,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            RejectReason::NotActive => "no active round",
            RejectReason::TimeExpired => "time expired",
            RejectReason::AlreadySubmitting => "submission already in flight",
        };
        f.write_str(text)
    }
}

/// Non-fatal conditions surfaced through the notification stream. None of
/// these corrupt state; the worst case is a return to `Idle`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoundFault {
    #[error("failed to fetch puzzle")]
    PuzzleFetchFailed,
    #[error("submission rejected: {0}")]
    SubmissionRejected(RejectReason),
    #[error("answer is empty")]
    InvalidAnswer,
    #[error("answer judge unavailable")]
    JudgeUnavailable,
    #[error("stale response discarded")]
    StaleResponseDiscarded,
}

/// One observable occurrence. Every phase transition is delivered exactly
/// once, in order, with no coalescing of intermediate phases.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundNotice {
    Transition(RoundPhase),
    Tick { remaining: u32 },
    Resolved(Resolution),
    Fault(RoundFault),
}

/// Read-only view handed out to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundSnapshot {
    pub phase: RoundPhase,
    pub puzzle: Option<Puzzle>,
    pub remaining: u32,
    pub stats: SessionStats,
}

impl Default for RoundSnapshot {
    fn default() -> Self {
        RoundMachine::new().snapshot()
    }
}

/// The round state machine. Purely synchronous: it consumes one event at a
/// time and emits the effects the driver must carry out. All stats and
/// round state are owned here and mutated nowhere else.
#[derive(Debug)]
pub struct RoundMachine {
    phase: RoundPhase,
    seq: u64,
    puzzle: Option<Puzzle>,
    remaining: u32,
    submitting: bool,
    stats: SessionStats,
}

impl Default for RoundMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundMachine {
    pub fn new() -> Self {
        Self {
            phase: RoundPhase::Idle,
            seq: 0,
            puzzle: None,
            remaining: 0,
            submitting: false,
            stats: SessionStats::default(),
        }
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            phase: self.phase,
            puzzle: self.puzzle.clone(),
            remaining: self.remaining,
            stats: self.stats.clone(),
        }
    }

    pub fn handle(&mut self, event: RoundEvent) -> Vec<Effect> {
        match event {
            RoundEvent::Start => self.on_start(),
            RoundEvent::Tick { seq } => self.on_tick(seq),
            RoundEvent::Submit { answer } => self.on_submit(answer),
            RoundEvent::PuzzleReady { seq, puzzle } => self.on_puzzle_ready(seq, puzzle),
            RoundEvent::PuzzleFailed { seq } => self.on_puzzle_failed(seq),
            RoundEvent::Judged { seq, judgment } => self.on_judged(seq, judgment),
            RoundEvent::JudgeFailed { seq } => self.on_judge_failed(seq),
        }
    }

    /// Begins (or restarts) a fetch. A start issued while a prior fetch is
    /// outstanding bumps the sequence number so the earlier completion is
    /// discarded instead of being applied to the wrong round.
    fn on_start(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.phase == RoundPhase::Active {
            effects.push(Effect::StopTicker);
        }
        self.puzzle = None;
        self.remaining = 0;
        self.submitting = false;
        self.begin_fetch(&mut effects);
        effects
    }

    fn on_tick(&mut self, seq: u64) -> Vec<Effect> {
        // Ticks queued before the ticker was stopped, or belonging to a
        // superseded round, are dropped without comment.
        if self.phase != RoundPhase::Active || seq != self.seq {
            return Vec::new();
        }

        self.remaining = self.remaining.saturating_sub(1);
        let mut effects = vec![Effect::Notify(RoundNotice::Tick {
            remaining: self.remaining,
        })];

        if self.remaining == 0 {
            // Timeout is a judge-less incorrect resolution, recorded locally.
            effects.push(Effect::StopTicker);
            self.set_phase(RoundPhase::Resolving, &mut effects);
            self.stats.record_miss();
            effects.push(Effect::Notify(RoundNotice::Resolved(Resolution::Timeout)));
            self.begin_fetch(&mut effects);
        }

        effects
    }

    fn on_submit(&mut self, answer: String) -> Vec<Effect> {
        let rejection = match self.phase {
            RoundPhase::Active if self.remaining == 0 => Some(RejectReason::TimeExpired),
            RoundPhase::Active => None,
            RoundPhase::Resolving if self.submitting => Some(RejectReason::AlreadySubmitting),
            _ => Some(RejectReason::NotActive),
        };
        if let Some(reason) = rejection {
            return vec![Effect::Notify(RoundNotice::Fault(
                RoundFault::SubmissionRejected(reason),
            ))];
        }

        let trimmed = answer.trim();
        if trimmed.is_empty() {
            return vec![Effect::Notify(RoundNotice::Fault(RoundFault::InvalidAnswer))];
        }

        let Some(puzzle) = &self.puzzle else {
            return vec![Effect::Notify(RoundNotice::Fault(
                RoundFault::SubmissionRejected(RejectReason::NotActive),
            ))];
        };

        self.submitting = true;
        let mut effects = vec![Effect::StopTicker];
        let puzzle_id = puzzle.puzzle_id.clone();
        self.set_phase(RoundPhase::Resolving, &mut effects);
        effects.push(Effect::JudgeAnswer {
            seq: self.seq,
            puzzle_id,
            answer: trimmed.to_string(),
        });
        effects
    }

    fn on_puzzle_ready(&mut self, seq: u64, puzzle: Puzzle) -> Vec<Effect> {
        if seq != self.seq || self.phase != RoundPhase::Loading {
            return self.discard_stale();
        }

        self.remaining = puzzle.effective_time_limit();
        self.puzzle = Some(puzzle);
        self.submitting = false;
        // Ticker first: by the time observers see the Active transition the
        // tick subscription is already live.
        let mut effects = vec![Effect::StartTicker { seq: self.seq }];
        self.set_phase(RoundPhase::Active, &mut effects);
        effects
    }

    fn on_puzzle_failed(&mut self, seq: u64) -> Vec<Effect> {
        if seq != self.seq || self.phase != RoundPhase::Loading {
            return self.discard_stale();
        }

        let mut effects = vec![Effect::Notify(RoundNotice::Fault(
            RoundFault::PuzzleFetchFailed,
        ))];
        self.set_phase(RoundPhase::Idle, &mut effects);
        effects
    }

    fn on_judged(&mut self, seq: u64, judgment: Judgment) -> Vec<Effect> {
        if seq != self.seq || self.phase != RoundPhase::Resolving || !self.submitting {
            return self.discard_stale();
        }

        self.submitting = false;
        let resolution = if judgment.correct {
            self.stats.record_correct(judgment.new_score);
            Resolution::Correct {
                points_awarded: judgment.points_awarded,
                new_score: judgment.new_score,
            }
        } else {
            self.stats.record_miss();
            Resolution::Incorrect
        };

        let mut effects = vec![Effect::Notify(RoundNotice::Resolved(resolution))];
        self.puzzle = None;
        self.remaining = 0;
        self.begin_fetch(&mut effects);
        effects
    }

    /// The judge erred rather than judged: the round is not consumed. The
    /// countdown resumes from its last known value and the caller may
    /// resubmit.
    fn on_judge_failed(&mut self, seq: u64) -> Vec<Effect> {
        if seq != self.seq || self.phase != RoundPhase::Resolving || !self.submitting {
            return self.discard_stale();
        }

        self.submitting = false;
        let mut effects = vec![
            Effect::Notify(RoundNotice::Fault(RoundFault::JudgeUnavailable)),
            Effect::StartTicker { seq: self.seq },
        ];
        self.set_phase(RoundPhase::Active, &mut effects);
        effects
    }

    fn begin_fetch(&mut self, effects: &mut Vec<Effect>) {
        self.seq += 1;
        self.set_phase(RoundPhase::Loading, effects);
        effects.push(Effect::FetchPuzzle { seq: self.seq });
    }

    fn set_phase(&mut self, phase: RoundPhase, effects: &mut Vec<Effect>) {
        if self.phase != phase {
            self.phase = phase;
            effects.push(Effect::Notify(RoundNotice::Transition(phase)));
        }
    }

    fn discard_stale(&self) -> Vec<Effect> {
        tracing::debug!(current_seq = self.seq, phase = ?self.phase, "discarding stale completion");
        vec![Effect::Notify(RoundNotice::Fault(
            RoundFault::StaleResponseDiscarded,
        ))]
    }
}
