//! The mailbox queue: a suspendable, closable FIFO with capacity control.

// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

// Layer 2: Third-party crate imports
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;

// Layer 3: Internal module imports
use super::overflow::OverflowPolicy;

/// Mailbox capacity configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MailboxCapacity {
    /// Bounded mailbox with a positive maximum capacity.
    Bounded(usize),

    /// Unbounded mailbox (no capacity limit, no overflow policy).
    Unbounded,
}

/// Configuration for a single actor's mailbox.
///
/// The default is an unbounded FIFO. Bounded mailboxes additionally carry
/// an [`OverflowPolicy`] that decides what happens when the queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailboxConfig {
    /// Bounded or unbounded capacity.
    pub capacity: MailboxCapacity,

    /// Overflow policy, consulted only when the capacity is bounded.
    pub overflow: OverflowPolicy,
}

impl MailboxConfig {
    /// An unbounded mailbox.
    pub fn unbounded() -> Self {
        Self {
            capacity: MailboxCapacity::Unbounded,
            overflow: OverflowPolicy::default(),
        }
    }

    /// A bounded mailbox with the given capacity and overflow policy.
    pub fn bounded(capacity: usize, overflow: OverflowPolicy) -> Self {
        Self {
            capacity: MailboxCapacity::Bounded(capacity),
            overflow,
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if let MailboxCapacity::Bounded(0) = self.capacity {
            return Err("bounded mailbox capacity must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Outcome of offering an item to a mailbox.
///
/// Displaced items are handed back to the caller so the delivery path can
/// route them (dead letters for `Rejected`/`Closed`) or drop them.
#[derive(Debug)]
pub enum SendOutcome<T> {
    /// The item was enqueued.
    Enqueued,

    /// The queue was full; the previous head was removed to make room and
    /// is returned for disposal. The new item was enqueued.
    DroppedOldest(T),

    /// The queue was full; the incoming item was not enqueued.
    DroppedNewest(T),

    /// The queue was full under the `Reject` policy; the incoming item
    /// must be routed to dead letters by the caller.
    Rejected(T),

    /// The mailbox is closed; the incoming item must be routed to dead
    /// letters by the caller.
    Closed(T),
}

/// A strict-FIFO mailbox with suspend/resume/close semantics.
///
/// Invariants:
/// - While suspended or closed, [`Mailbox::take_next`] yields nothing, so
///   no dispatch happens.
/// - While closed, offers return [`SendOutcome::Closed`]; resume after
///   close is a no-op.
/// - FIFO order is strict within one mailbox; there is no ordering
///   guarantee across mailboxes.
///
/// The mailbox itself is policy-free about *where* displaced messages go;
/// the delivery path owns dead-letter routing.
pub struct Mailbox<T> {
    queue: Mutex<VecDeque<T>>,
    capacity: MailboxCapacity,
    overflow: OverflowPolicy,
    suspended: AtomicBool,
    closed: AtomicBool,
    dropped: AtomicU64,
    signal: Notify,
}

impl<T: Send> Mailbox<T> {
    /// Create a mailbox from its configuration.
    pub fn new(config: MailboxConfig) -> Self {
        let initial = match config.capacity {
            MailboxCapacity::Bounded(n) => n.min(1024),
            MailboxCapacity::Unbounded => 16,
        };
        Self {
            queue: Mutex::new(VecDeque::with_capacity(initial)),
            capacity: config.capacity,
            overflow: config.overflow,
            suspended: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            dropped: AtomicU64::new(0),
            signal: Notify::new(),
        }
    }

    /// Offer an item under capacity rules.
    ///
    /// Suspension does not block offers; it only blocks dispatch. A
    /// dispatch turn is signalled whenever an item lands in a
    /// non-suspended mailbox.
    pub fn offer(&self, item: T) -> SendOutcome<T> {
        if self.closed.load(Ordering::Acquire) {
            return SendOutcome::Closed(item);
        }

        let outcome = {
            let mut queue = self.queue.lock();
            match self.capacity {
                MailboxCapacity::Bounded(limit) if queue.len() >= limit => match self.overflow {
                    OverflowPolicy::DropOldest => {
                        let displaced = queue.pop_front();
                        queue.push_back(item);
                        self.dropped.fetch_add(1, Ordering::Relaxed);
                        match displaced {
                            Some(old) => SendOutcome::DroppedOldest(old),
                            // Capacity 0 is rejected by validation; treat an
                            // empty full queue as a plain enqueue.
                            None => SendOutcome::Enqueued,
                        }
                    }
                    OverflowPolicy::DropNewest => {
                        self.dropped.fetch_add(1, Ordering::Relaxed);
                        SendOutcome::DroppedNewest(item)
                    }
                    OverflowPolicy::Reject => {
                        self.dropped.fetch_add(1, Ordering::Relaxed);
                        SendOutcome::Rejected(item)
                    }
                },
                _ => {
                    queue.push_back(item);
                    SendOutcome::Enqueued
                }
            }
        };

        if !self.suspended.load(Ordering::Acquire) {
            self.signal.notify_one();
        }
        outcome
    }

    /// Pop the head message, but only while the mailbox is receivable.
    pub(crate) fn take_next(&self) -> Option<T> {
        if !self.is_receivable() {
            return None;
        }
        self.queue.lock().pop_front()
    }

    /// Suspend dispatch. Idempotent; offers still accumulate.
    pub fn suspend(&self) {
        self.suspended.store(true, Ordering::Release);
    }

    /// Resume dispatch if not closed. Idempotent; signals a dispatch turn
    /// when messages are queued.
    pub fn resume(&self) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        self.suspended.store(false, Ordering::Release);
        if !self.is_empty() {
            self.signal.notify_one();
        }
    }

    /// Close the mailbox and drain any queued messages.
    ///
    /// Idempotent: the second close returns an empty drain. The caller is
    /// responsible for dead-lettering the drained messages.
    pub fn close(&self) -> Vec<T> {
        self.closed.store(true, Ordering::Release);
        let drained: Vec<T> = self.queue.lock().drain(..).collect();
        self.signal.notify_one();
        drained
    }

    /// True iff not suspended, not closed, and non-empty.
    pub fn is_receivable(&self) -> bool {
        !self.suspended.load(Ordering::Acquire)
            && !self.closed.load(Ordering::Acquire)
            && !self.is_empty()
    }

    /// Whether dispatch is currently suspended.
    pub fn is_suspended(&self) -> bool {
        self.suspended.load(Ordering::Acquire)
    }

    /// Whether the mailbox has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Number of queued messages.
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Messages discarded or rejected under the overflow policy.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// The configured capacity.
    pub fn capacity(&self) -> MailboxCapacity {
        self.capacity
    }

    /// Wait until a dispatch turn is signalled.
    pub(crate) async fn signalled(&self) {
        self.signal.notified().await;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn bounded(capacity: usize, overflow: OverflowPolicy) -> Mailbox<i32> {
        Mailbox::new(MailboxConfig::bounded(capacity, overflow))
    }

    #[test]
    fn test_fifo_order() {
        let mailbox: Mailbox<i32> = Mailbox::new(MailboxConfig::unbounded());
        for value in 1..=5 {
            assert!(matches!(mailbox.offer(value), SendOutcome::Enqueued));
        }
        let drained: Vec<i32> = std::iter::from_fn(|| mailbox.take_next()).collect();
        assert_eq!(drained, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_drop_oldest_keeps_last_capacity_messages() {
        let mailbox = bounded(3, OverflowPolicy::DropOldest);
        mailbox.suspend();
        for value in 1..=5 {
            mailbox.offer(value);
        }
        assert_eq!(mailbox.len(), 3);
        assert_eq!(mailbox.dropped_count(), 2);
        mailbox.resume();
        let kept: Vec<i32> = std::iter::from_fn(|| mailbox.take_next()).collect();
        assert_eq!(kept, vec![3, 4, 5]);
    }

    #[test]
    fn test_drop_newest_keeps_first_capacity_messages() {
        let mailbox = bounded(3, OverflowPolicy::DropNewest);
        mailbox.suspend();
        for value in 1..=5 {
            mailbox.offer(value);
        }
        assert_eq!(mailbox.len(), 3);
        assert_eq!(mailbox.dropped_count(), 2);
        mailbox.resume();
        let kept: Vec<i32> = std::iter::from_fn(|| mailbox.take_next()).collect();
        assert_eq!(kept, vec![1, 2, 3]);
    }

    #[test]
    fn test_reject_hands_back_overflowing_item() {
        let mailbox = bounded(2, OverflowPolicy::Reject);
        mailbox.offer(1);
        mailbox.offer(2);
        match mailbox.offer(3) {
            SendOutcome::Rejected(value) => assert_eq!(value, 3),
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(mailbox.dropped_count(), 1);
        assert_eq!(mailbox.len(), 2);
    }

    #[test]
    fn test_suspended_mailbox_is_not_receivable() {
        let mailbox: Mailbox<i32> = Mailbox::new(MailboxConfig::unbounded());
        mailbox.offer(1);
        assert!(mailbox.is_receivable());
        mailbox.suspend();
        assert!(!mailbox.is_receivable());
        assert!(mailbox.take_next().is_none());
        mailbox.resume();
        assert_eq!(mailbox.take_next(), Some(1));
    }

    #[test]
    fn test_close_drains_and_diverts_sends() {
        let mailbox: Mailbox<i32> = Mailbox::new(MailboxConfig::unbounded());
        mailbox.offer(1);
        mailbox.offer(2);
        let drained = mailbox.close();
        assert_eq!(drained, vec![1, 2]);
        assert!(mailbox.is_closed());
        assert!(matches!(mailbox.offer(3), SendOutcome::Closed(3)));
        // Second close is an empty drain.
        assert!(mailbox.close().is_empty());
    }

    #[test]
    fn test_resume_after_close_is_noop() {
        let mailbox: Mailbox<i32> = Mailbox::new(MailboxConfig::unbounded());
        mailbox.close();
        mailbox.resume();
        assert!(mailbox.is_closed());
        assert!(!mailbox.is_receivable());
    }

    #[test]
    fn test_suspend_and_resume_are_idempotent() {
        let mailbox: Mailbox<i32> = Mailbox::new(MailboxConfig::unbounded());
        mailbox.suspend();
        mailbox.suspend();
        assert!(mailbox.is_suspended());
        mailbox.resume();
        mailbox.resume();
        assert!(!mailbox.is_suspended());
    }

    #[test]
    fn test_config_validation() {
        assert!(MailboxConfig::bounded(0, OverflowPolicy::Reject)
            .validate()
            .is_err());
        assert!(MailboxConfig::bounded(1, OverflowPolicy::Reject)
            .validate()
            .is_ok());
        assert!(MailboxConfig::unbounded().validate().is_ok());
    }

    #[tokio::test]
    async fn test_offer_signals_dispatch_turn() {
        let mailbox: Mailbox<i32> = Mailbox::new(MailboxConfig::unbounded());
        mailbox.offer(7);
        // The permit was stored by the offer, so this resolves immediately.
        mailbox.signalled().await;
        assert_eq!(mailbox.take_next(), Some(7));
    }
}
