//! The stage-wide sink for undeliverable messages.

// Layer 1: Standard library imports
use std::fmt;
use std::sync::Arc;

// Layer 2: Third-party crate imports
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

// Layer 3: Internal module imports
use crate::logging::Logger;
use crate::util::Address;

/// Record of a message that could not be delivered.
#[derive(Debug, Clone)]
pub struct DeadLetter {
    /// The address the message was sent to.
    pub address: Address,

    /// Textual form of the message, `protocol::selector`.
    pub representation: String,

    /// Why delivery failed ("actor stopped", "mailbox overflow").
    pub reason: String,

    /// When the letter was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl DeadLetter {
    /// Build a letter for an undelivered message.
    pub fn undelivered(
        address: Address,
        representation: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            address,
            representation: representation.into(),
            reason: reason.into(),
            recorded_at: Utc::now(),
        }
    }
}

impl fmt::Display for DeadLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dead letter to {}: {} ({})",
            self.address, self.representation, self.reason
        )
    }
}

/// Receives every dead letter recorded on a stage.
pub trait DeadLettersListener: Send + Sync {
    /// Called synchronously for each recorded letter.
    fn on_dead_letter(&self, letter: &DeadLetter);
}

/// The dead-letters sink owned by a stage.
///
/// Letters are broadcast synchronously to all currently registered
/// listeners, immediately after the event that decided non-delivery. The
/// listener list is copied out of its guard before the callbacks run, so
/// listeners may register or unregister from inside a callback.
#[derive(Clone)]
pub struct DeadLetters {
    inner: Arc<DeadLettersInner>,
}

struct DeadLettersInner {
    listeners: RwLock<Vec<Arc<dyn DeadLettersListener>>>,
    logger: Arc<dyn Logger>,
}

impl DeadLetters {
    pub(crate) fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            inner: Arc::new(DeadLettersInner {
                listeners: RwLock::new(Vec::new()),
                logger,
            }),
        }
    }

    /// Register a listener.
    pub fn register_listener(&self, listener: Arc<dyn DeadLettersListener>) {
        self.inner.listeners.write().push(listener);
    }

    /// Unregister a previously registered listener (matched by identity).
    /// Returns whether it was registered.
    pub fn unregister_listener(&self, listener: &Arc<dyn DeadLettersListener>) -> bool {
        let mut listeners = self.inner.listeners.write();
        let before = listeners.len();
        listeners.retain(|registered| !Arc::ptr_eq(registered, listener));
        listeners.len() != before
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.read().len()
    }

    /// Record a letter and broadcast it.
    pub fn failed_delivery(&self, letter: DeadLetter) {
        self.inner.logger.debug(&letter.to_string());
        let listeners: Vec<Arc<dyn DeadLettersListener>> =
            self.inner.listeners.read().clone();
        for listener in listeners {
            listener.on_dead_letter(&letter);
        }
    }
}
