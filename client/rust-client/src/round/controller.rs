use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::models::{Judgment, Puzzle};
use crate::round::clock::Clock;
use crate::round::machine::{Effect, RoundEvent, RoundMachine, RoundNotice, RoundSnapshot};

/// Supplies a fresh puzzle on demand. Errors are transient and retryable by
/// the caller; the controller itself never retries.
#[async_trait]
pub trait PuzzleSource: Send + Sync {
    async fn fetch_puzzle(&self) -> Result<Puzzle>;
}

/// Scores a submitted answer. An `Err` means "we could not find out", which
/// is distinct from a wrong answer and does not consume the round.
#[async_trait]
pub trait AnswerJudge: Send + Sync {
    async fn judge(&self, puzzle_id: &str, answer: &str) -> Result<Judgment>;
}

enum Input {
    Event(RoundEvent),
    Subscribe(mpsc::UnboundedSender<RoundNotice>),
}

/// Handle to a running round controller. The state machine itself runs on a
/// dedicated task that processes one event at a time; this handle only
/// enqueues commands and reads the latest snapshot. Dropping the handle
/// tears the controller down.
pub struct RoundController {
    inputs: mpsc::UnboundedSender<Input>,
    snapshot_rx: watch::Receiver<RoundSnapshot>,
    worker: JoinHandle<()>,
}

impl RoundController {
    pub fn new(
        source: Arc<dyn PuzzleSource>,
        judge: Arc<dyn AnswerJudge>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let machine = RoundMachine::new();
        let (snapshot_tx, snapshot_rx) = watch::channel(machine.snapshot());

        let driver = Driver {
            machine,
            inputs: input_rx,
            input_tx: input_tx.clone(),
            source,
            judge,
            clock,
            subscribers: Vec::new(),
            snapshot_tx,
            ticker: None,
        };
        let worker = tokio::spawn(driver.run());

        Self {
            inputs: input_tx,
            snapshot_rx,
            worker,
        }
    }

    /// Requests a new round. Outcome (active round or `PuzzleFetchFailed`)
    /// arrives through the notification stream.
    pub fn start(&self) {
        let _ = self.inputs.send(Input::Event(RoundEvent::Start));
    }

    /// Submits an answer for the active round. Local policy violations are
    /// reported as `SubmissionRejected` / `InvalidAnswer` notices.
    pub fn submit(&self, answer: impl Into<String>) {
        let _ = self.inputs.send(Input::Event(RoundEvent::Submit {
            answer: answer.into(),
        }));
    }

    /// Current read-only view of the controller.
    pub fn snapshot(&self) -> RoundSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Registers an observer. Every notice is delivered exactly once, in
    /// order, with no coalescing.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<RoundNotice> {
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = self.inputs.send(Input::Subscribe(tx));
        rx
    }
}

impl Drop for RoundController {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

struct Driver {
    machine: RoundMachine,
    inputs: mpsc::UnboundedReceiver<Input>,
    input_tx: mpsc::UnboundedSender<Input>,
    source: Arc<dyn PuzzleSource>,
    judge: Arc<dyn AnswerJudge>,
    clock: Arc<dyn Clock>,
    subscribers: Vec<mpsc::UnboundedSender<RoundNotice>>,
    snapshot_tx: watch::Sender<RoundSnapshot>,
    ticker: Option<JoinHandle<()>>,
}

impl Driver {
    async fn run(mut self) {
        while let Some(input) = self.inputs.recv().await {
            match input {
                Input::Subscribe(tx) => self.subscribers.push(tx),
                Input::Event(event) => {
                    let effects = self.machine.handle(event);
                    // Publish the snapshot before notifying so an observer
                    // woken by a notice never reads pre-transition state.
                    let _ = self.snapshot_tx.send(self.machine.snapshot());
                    for effect in effects {
                        self.apply(effect);
                    }
                }
            }
        }
        self.stop_ticker();
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::FetchPuzzle { seq } => {
                let source = Arc::clone(&self.source);
                let tx = self.input_tx.clone();
                tokio::spawn(async move {
                    let event = match source.fetch_puzzle().await {
                        Ok(puzzle) => RoundEvent::PuzzleReady { seq, puzzle },
                        Err(e) => {
                            tracing::warn!("Puzzle fetch failed: {:#}", e);
                            RoundEvent::PuzzleFailed { seq }
                        }
                    };
                    let _ = tx.send(Input::Event(event));
                });
            }
            Effect::JudgeAnswer {
                seq,
                puzzle_id,
                answer,
            } => {
                let judge = Arc::clone(&self.judge);
                let tx = self.input_tx.clone();
                tokio::spawn(async move {
                    let event = match judge.judge(&puzzle_id, &answer).await {
                        Ok(judgment) => RoundEvent::Judged { seq, judgment },
                        Err(e) => {
                            tracing::warn!("Judge call failed for puzzle {}: {:#}", puzzle_id, e);
                            RoundEvent::JudgeFailed { seq }
                        }
                    };
                    let _ = tx.send(Input::Event(event));
                });
            }
            Effect::StartTicker { seq } => {
                self.stop_ticker();
                let mut ticks = self.clock.ticks();
                let tx = self.input_tx.clone();
                self.ticker = Some(tokio::spawn(async move {
                    while ticks.next().await.is_some() {
                        if tx.send(Input::Event(RoundEvent::Tick { seq })).is_err() {
                            break;
                        }
                    }
                }));
            }
            Effect::StopTicker => self.stop_ticker(),
            Effect::Notify(notice) => {
                self.subscribers.retain(|tx| tx.send(notice.clone()).is_ok());
            }
        }
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}
