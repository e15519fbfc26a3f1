//! Shared logical tick counter.

use doorlock_core::constants::DEFAULT_TICK_PERIOD_MS;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::trace;

/// A watchable logical clock counting whole ticks.
///
/// Clones share the same counter. Reads never tear and waiters are woken
/// on every advance, which is what lets the timed sequences block on a
/// deadline instead of polling.
///
/// In production a [`Ticker`] advances the clock once per tick period;
/// tests call [`advance`](TickClock::advance) directly and drive the
/// sequences deterministically.
///
/// # Examples
///
/// ```
/// use doorlock_timing::TickClock;
///
/// #[tokio::main]
/// async fn main() {
///     let clock = TickClock::new();
///     assert_eq!(clock.now(), 0);
///
///     clock.advance(15);
///     clock.wait_until(15).await; // already reached, returns immediately
///     assert_eq!(clock.now(), 15);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct TickClock {
    ticks: Arc<watch::Sender<u32>>,
}

impl TickClock {
    /// Create a clock at tick zero.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { ticks: Arc::new(tx) }
    }

    /// Current tick count.
    #[must_use]
    pub fn now(&self) -> u32 {
        *self.ticks.borrow()
    }

    /// Reset the counter to zero.
    ///
    /// Each timed sequence resets the clock when it starts, so deadlines
    /// are always counted from the start of the sequence.
    pub fn reset(&self) {
        self.ticks.send_replace(0);
    }

    /// Advance the counter by `ticks`, waking all waiters.
    pub fn advance(&self, ticks: u32) {
        self.ticks.send_modify(|t| *t = t.saturating_add(ticks));
        trace!(now = self.now(), "tick");
    }

    /// Wait until the counter reaches `deadline`.
    ///
    /// Returns immediately if the deadline has already passed.
    pub async fn wait_until(&self, deadline: u32) {
        let mut rx = self.ticks.subscribe();
        loop {
            if *rx.borrow_and_update() >= deadline {
                return;
            }
            // Cannot fail while this clock holds the sender
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Spawn a task advancing the clock once per `period`.
    ///
    /// The returned [`Ticker`] stops the task when dropped. The default
    /// production period is [`DEFAULT_TICK_PERIOD_MS`].
    pub fn start_periodic(&self, period: Duration) -> Ticker {
        let clock = self.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first interval tick completes immediately; skip it so
            // the clock stays at its starting value for a full period.
            interval.tick().await;
            loop {
                interval.tick().await;
                clock.advance(1);
            }
        });
        Ticker { handle }
    }

    /// Spawn a ticker at the production tick period.
    pub fn start(&self) -> Ticker {
        self.start_periodic(Duration::from_millis(DEFAULT_TICK_PERIOD_MS))
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard for a running periodic ticker task.
///
/// Aborts the task when dropped.
#[derive(Debug)]
pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Stop the ticker.
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
