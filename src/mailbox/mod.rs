//! Per-actor FIFO mailboxes with suspension, closing, and overflow control.
//!
//! Every actor owns exactly one [`Mailbox`]. The mailbox is a strict FIFO
//! queue that can be suspended (messages accumulate but are not dispatched),
//! resumed, and closed (further sends are diverted to dead letters by the
//! delivery path). Bounded mailboxes apply an [`OverflowPolicy`] when full.

pub mod overflow;
pub mod queue;

pub use overflow::OverflowPolicy;
pub use queue::{Mailbox, MailboxCapacity, MailboxConfig, SendOutcome};
