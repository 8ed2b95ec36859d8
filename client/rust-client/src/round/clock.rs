use std::time::Duration;

use futures::stream::{self, BoxStream, StreamExt};
use tokio::time::sleep;

/// Tick source driving the countdown. Production uses [`SystemClock`]; tests
/// substitute a hand-cranked implementation so no wall time is involved.
pub trait Clock: Send + Sync {
    /// Returns a stream yielding one item per tick. The controller owns the
    /// subscription: it is consumed while a round is active and dropped when
    /// the round leaves the active phase.
    fn ticks(&self) -> BoxStream<'static, ()>;
}

/// Wall-clock ticker, one tick per whole second by default.
pub struct SystemClock {
    period: Duration,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            period: Duration::from_secs(1),
        }
    }

    pub fn with_period(period: Duration) -> Self {
        Self { period }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn ticks(&self) -> BoxStream<'static, ()> {
        let period = self.period;
        stream::unfold((), move |()| async move {
            sleep(period).await;
            Some(((), ()))
        })
        .boxed()
    }
}
