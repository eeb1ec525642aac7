//! Deterministic helpers for testing actors.
//!
//! The kit covers the three things actor tests need: waiting on
//! actor-visible state ([`ObservableState`], [`eventually`]), observing
//! dead letters ([`CapturingDeadLetters`]), and observing log output
//! ([`CapturingLogger`]). Mailbox helpers expose suspension and drop
//! counters for backpressure scenarios without widening the proxy
//! surface.

// Layer 1: Standard library imports
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::{sleep, timeout};

// Layer 3: Internal module imports
use crate::actor::proxy::Proxy;
use crate::actor::traits::Actor;
use crate::dead_letters::{DeadLetter, DeadLettersListener};
use crate::logging::Logger;

/// Waiting on a condition timed out.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("condition not met within {waited_ms} ms")]
pub struct AwaitTimeout {
    /// How long was waited, in milliseconds.
    pub waited_ms: u64,
}

/// Shared state an actor exposes for assertions.
///
/// Handlers mutate it through a clone; tests await predicates over it
/// without polling races.
///
/// ```rust,ignore
/// let events = ObservableState::new(Vec::<String>::new());
/// // inside a handler: events.update(|log| log.push("after_stop".into()));
/// let log = events
///     .await_that(Duration::from_secs(1), |log| log.len() >= 3)
///     .await?;
/// ```
pub struct ObservableState<T> {
    inner: Arc<ObservableInner<T>>,
}

struct ObservableInner<T> {
    value: Mutex<T>,
    changed: Notify,
}

impl<T> Clone for ObservableState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + 'static> ObservableState<T> {
    /// Wrap an initial value.
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(ObservableInner {
                value: Mutex::new(initial),
                changed: Notify::new(),
            }),
        }
    }

    /// Replace the value and wake waiters.
    pub fn set(&self, value: T) {
        *self.inner.value.lock() = value;
        self.inner.changed.notify_waiters();
    }

    /// Mutate the value in place and wake waiters.
    pub fn update(&self, mutate: impl FnOnce(&mut T)) {
        mutate(&mut self.inner.value.lock());
        self.inner.changed.notify_waiters();
    }

    /// Copy of the current value.
    pub fn get(&self) -> T {
        self.inner.value.lock().clone()
    }

    /// Wait until the predicate holds, returning the satisfying value.
    pub async fn await_that(
        &self,
        deadline: Duration,
        predicate: impl Fn(&T) -> bool,
    ) -> Result<T, AwaitTimeout> {
        let wait = async {
            loop {
                let notified = self.inner.changed.notified();
                {
                    let value = self.inner.value.lock();
                    if predicate(&value) {
                        return value.clone();
                    }
                }
                notified.await;
            }
        };
        timeout(deadline, wait).await.map_err(|_| AwaitTimeout {
            waited_ms: deadline.as_millis() as u64,
        })
    }
}

/// Poll a condition until it holds or the deadline elapses.
pub async fn eventually(deadline: Duration, condition: impl Fn() -> bool) -> bool {
    let poll = async {
        while !condition() {
            sleep(Duration::from_millis(5)).await;
        }
    };
    timeout(deadline, poll).await.is_ok()
}

/// Wait until an actor reports stopped.
pub async fn await_stopped<A: Actor>(proxy: &Proxy<A>, deadline: Duration) -> bool {
    eventually(deadline, || proxy.is_stopped()).await
}

/// Dead-letters listener that retains every letter in arrival order.
#[derive(Default)]
pub struct CapturingDeadLetters {
    letters: Mutex<Vec<DeadLetter>>,
}

impl CapturingDeadLetters {
    /// A fresh capturing listener, ready to register.
    pub fn arc() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// All captured letters, in order.
    pub fn letters(&self) -> Vec<DeadLetter> {
        self.letters.lock().clone()
    }

    /// Number of captured letters.
    pub fn len(&self) -> usize {
        self.letters.lock().len()
    }

    /// Whether nothing has been captured.
    pub fn is_empty(&self) -> bool {
        self.letters.lock().is_empty()
    }

    /// Letters whose representation contains the fragment.
    pub fn containing(&self, fragment: &str) -> Vec<DeadLetter> {
        self.letters
            .lock()
            .iter()
            .filter(|letter| letter.representation.contains(fragment))
            .cloned()
            .collect()
    }

    /// Letters recorded with the given reason.
    pub fn with_reason(&self, reason: &str) -> Vec<DeadLetter> {
        self.letters
            .lock()
            .iter()
            .filter(|letter| letter.reason == reason)
            .cloned()
            .collect()
    }
}

impl DeadLettersListener for CapturingDeadLetters {
    fn on_dead_letter(&self, letter: &DeadLetter) {
        self.letters.lock().push(letter.clone());
    }
}

/// A captured log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// The level the line was logged at.
    pub level: &'static str,

    /// The message.
    pub message: String,
}

/// Logger that retains every line for assertions.
#[derive(Default)]
pub struct CapturingLogger {
    lines: Mutex<Vec<LogLine>>,
}

impl CapturingLogger {
    /// A fresh capturing logger.
    pub fn arc() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// All captured lines, in order.
    pub fn lines(&self) -> Vec<LogLine> {
        self.lines.lock().clone()
    }

    /// Whether any line at the level contains the fragment.
    pub fn contains(&self, level: &str, fragment: &str) -> bool {
        self.lines
            .lock()
            .iter()
            .any(|line| line.level == level && line.message.contains(fragment))
    }

    fn push(&self, level: &'static str, message: &str) {
        self.lines.lock().push(LogLine {
            level,
            message: message.to_string(),
        });
    }
}

impl Logger for CapturingLogger {
    fn debug(&self, message: &str) -> &dyn Logger {
        self.push("debug", message);
        self
    }

    fn info(&self, message: &str) -> &dyn Logger {
        self.push("info", message);
        self
    }

    fn log(&self, message: &str) -> &dyn Logger {
        self.push("log", message);
        self
    }

    fn error(&self, message: &str) -> &dyn Logger {
        self.push("error", message);
        self
    }
}

/// Suspend dispatch of an actor's mailbox (messages accumulate).
pub fn suspend_dispatch<A: Actor>(proxy: &Proxy<A>) {
    proxy.mailbox().suspend();
}

/// Resume dispatch of an actor's mailbox.
pub fn resume_dispatch<A: Actor>(proxy: &Proxy<A>) {
    proxy.mailbox().resume();
}

/// Messages dropped or rejected by the actor's mailbox overflow policy.
pub fn dropped_count<A: Actor>(proxy: &Proxy<A>) -> u64 {
    proxy.mailbox().dropped_count()
}

/// Messages currently queued in the actor's mailbox.
pub fn queued_count<A: Actor>(proxy: &Proxy<A>) -> usize {
    proxy.mailbox().len()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_observable_state_awaits_predicate() {
        let state = ObservableState::new(0i32);
        let writer = state.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(20)).await;
            writer.set(5);
        });
        let value = state
            .await_that(Duration::from_secs(1), |value| *value == 5)
            .await
            .unwrap();
        assert_eq!(value, 5);
    }

    #[tokio::test]
    async fn test_observable_state_times_out() {
        let state = ObservableState::new(0i32);
        let outcome = state
            .await_that(Duration::from_millis(30), |value| *value == 1)
            .await;
        assert!(outcome.is_err());
    }

    #[tokio::test]
    async fn test_eventually_polls() {
        let state = ObservableState::new(false);
        let writer = state.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(15)).await;
            writer.set(true);
        });
        assert!(eventually(Duration::from_secs(1), || state.get()).await);
        assert!(!eventually(Duration::from_millis(20), || false).await);
    }

    #[test]
    fn test_capturing_logger_records_levels() {
        let logger = CapturingLogger::default();
        logger.info("opening").error("hook `before_stop` failed");
        assert!(logger.contains("error", "before_stop"));
        assert!(!logger.contains("debug", "opening"));
        assert_eq!(logger.lines().len(), 2);
    }
}
