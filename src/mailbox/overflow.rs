//! Overflow policies for bounded mailboxes.

// Layer 1: Standard library imports
use std::fmt;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
// (none)

/// How a bounded mailbox handles an incoming message when it is full.
///
/// # Policy Selection
///
/// - **DropOldest**: keep the freshest work; suited to telemetry-like
///   streams where stale messages lose value.
/// - **DropNewest**: keep the oldest work; suited to strictly ordered
///   backlogs where late arrivals are expendable.
/// - **Reject**: tell the sender; the message is routed to dead letters
///   and the caller's deferred rejects with a mailbox-overflow fault.
///
/// Every applied policy increments the mailbox's dropped counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OverflowPolicy {
    /// Remove and discard the head of the queue, then enqueue the new
    /// message.
    DropOldest,

    /// Discard the incoming message.
    DropNewest,

    /// Redirect the incoming message to dead letters.
    #[default]
    Reject,
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DropOldest => write!(f, "DropOldest"),
            Self::DropNewest => write!(f, "DropNewest"),
            Self::Reject => write!(f, "Reject"),
        }
    }
}
