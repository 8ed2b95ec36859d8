use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bananagame_client::models::{Difficulty, Judgment, Puzzle};
use bananagame_client::round::{AnswerJudge, Clock, PuzzleSource};
use futures::stream::{BoxStream, StreamExt};
use tokio::sync::oneshot;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn puzzle(id: &str, difficulty: Difficulty, time_limit: Option<u32>) -> Puzzle {
    Puzzle {
        puzzle_id: id.to_string(),
        image_url: format!("https://cdn.example/{id}.png"),
        difficulty,
        points_value: 10,
        time_limit,
        created_at: None,
    }
}

pub fn judgment(correct: bool, points_awarded: u32, new_score: u64) -> Judgment {
    Judgment {
        correct,
        points_awarded,
        new_score,
    }
}

/// Puzzle source answering from a scripted queue; errors once exhausted.
pub struct ScriptedSource {
    queue: Mutex<VecDeque<Result<Puzzle>>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(responses: Vec<Result<Puzzle>>) -> Self {
        Self {
            queue: Mutex::new(responses.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PuzzleSource for ScriptedSource {
    async fn fetch_puzzle(&self) -> Result<Puzzle> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("scripted source exhausted")))
    }
}

/// Puzzle source that parks every fetch until the test releases it, for
/// exercising the stale-response guard.
#[derive(Default)]
pub struct GatedSource {
    pending: Mutex<VecDeque<oneshot::Sender<Result<Puzzle>>>>,
    calls: AtomicUsize,
}

impl GatedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Waits until `n` fetches have been issued and parked.
    pub async fn wait_for_calls(&self, n: usize) {
        while self.calls() < n {
            tokio::task::yield_now().await;
        }
    }

    /// Completes the oldest outstanding fetch, waiting for one to arrive if
    /// the controller has not issued it yet.
    pub async fn release(&self, result: Result<Puzzle>) {
        let mut result = Some(result);
        loop {
            let sender = self.pending.lock().unwrap().pop_front();
            if let Some(tx) = sender {
                let _ = tx.send(result.take().unwrap());
                return;
            }
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl PuzzleSource for GatedSource {
    async fn fetch_puzzle(&self) -> Result<Puzzle> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().push_back(tx);
        // Counted only after parking so wait_for_calls implies registration.
        self.calls.fetch_add(1, Ordering::SeqCst);
        rx.await.map_err(|_| anyhow!("gate dropped"))?
    }
}

/// Judge that parks every call until the test releases it.
#[derive(Default)]
pub struct GatedJudge {
    pending: Mutex<VecDeque<oneshot::Sender<Result<Judgment>>>>,
    calls: AtomicUsize,
}

impl GatedJudge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn release(&self, result: Result<Judgment>) {
        let mut result = Some(result);
        loop {
            let sender = self.pending.lock().unwrap().pop_front();
            if let Some(tx) = sender {
                let _ = tx.send(result.take().unwrap());
                return;
            }
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl AnswerJudge for GatedJudge {
    async fn judge(&self, _puzzle_id: &str, _answer: &str) -> Result<Judgment> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().push_back(tx);
        self.calls.fetch_add(1, Ordering::SeqCst);
        rx.await.map_err(|_| anyhow!("gate dropped"))?
    }
}

/// Judge answering from a scripted queue.
pub struct ScriptedJudge {
    queue: Mutex<VecDeque<Result<Judgment>>>,
    calls: AtomicUsize,
}

impl ScriptedJudge {
    pub fn new(responses: Vec<Result<Judgment>>) -> Self {
        Self {
            queue: Mutex::new(responses.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnswerJudge for ScriptedJudge {
    async fn judge(&self, _puzzle_id: &str, _answer: &str) -> Result<Judgment> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("scripted judge exhausted")))
    }
}

/// Hand-cranked clock: each `tick()` delivers exactly one tick to every live
/// subscription, so tests never depend on wall time. The controller opens a
/// fresh subscription each time a round becomes active; subscriptions whose
/// ticker has stopped are pruned on the next `tick()`.
#[derive(Default)]
pub struct ManualClock {
    senders: Mutex<Vec<futures::channel::mpsc::UnboundedSender<()>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&self) {
        self.senders
            .lock()
            .unwrap()
            .retain(|tx| tx.unbounded_send(()).is_ok());
    }
}

impl Clock for ManualClock {
    fn ticks(&self) -> BoxStream<'static, ()> {
        let (tx, rx) = futures::channel::mpsc::unbounded();
        self.senders.lock().unwrap().push(tx);
        rx.boxed()
    }
}
