//! Timed task scheduling with cancellation.

// Layer 1: Standard library imports
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;

// Layer 3: Internal module imports
use crate::logging::Logger;

/// Errors from scheduling operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    /// The scheduler has been closed; no further tasks are accepted.
    #[error("scheduler is closed")]
    Closed,
}

struct CancellableInner {
    cancelled: AtomicBool,
    finished: AtomicBool,
    handle: Mutex<Option<JoinHandle<()>>>,
}

/// Handle to a scheduled task.
///
/// `cancel` is idempotent: it returns true only on the first successful
/// cancellation, and false once the task already finished or was
/// cancelled. Cancellation prevents future firings but does not abort a
/// callback that is already running.
#[derive(Clone)]
pub struct Cancellable {
    inner: Arc<CancellableInner>,
}

impl Cancellable {
    fn new() -> Self {
        Self {
            inner: Arc::new(CancellableInner {
                cancelled: AtomicBool::new(false),
                finished: AtomicBool::new(false),
                handle: Mutex::new(None),
            }),
        }
    }

    fn attach(&self, handle: JoinHandle<()>) {
        *self.inner.handle.lock() = Some(handle);
    }

    fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    fn finish(&self) {
        self.inner.finished.store(true, Ordering::Release);
    }

    /// Cancel the task. True only on the first successful cancellation.
    pub fn cancel(&self) -> bool {
        if self.inner.finished.load(Ordering::Acquire) {
            return false;
        }
        let first = !self.inner.cancelled.swap(true, Ordering::AcqRel);
        if first {
            if let Some(handle) = self.inner.handle.lock().take() {
                handle.abort();
            }
        }
        first
    }
}

impl fmt::Debug for Cancellable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cancellable")
            .field("cancelled", &self.inner.cancelled.load(Ordering::Acquire))
            .field("finished", &self.inner.finished.load(Ordering::Acquire))
            .finish()
    }
}

struct SchedulerInner {
    closed: AtomicBool,
    tasks: Mutex<Vec<Cancellable>>,
    logger: Arc<dyn Logger>,
}

/// One-shot and repeating timed tasks for a stage.
///
/// Callback panics are caught and logged; a repeating schedule keeps
/// firing after a panicking tick. [`Scheduler::close`] cancels every
/// outstanding task and makes further scheduling fail.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<SchedulerInner>,
}

impl Scheduler {
    pub(crate) fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                closed: AtomicBool::new(false),
                tasks: Mutex::new(Vec::new()),
                logger,
            }),
        }
    }

    /// Fire `callback(data)` once after `delay`.
    pub fn schedule_once<D, F>(
        &self,
        callback: F,
        data: D,
        delay: Duration,
    ) -> Result<Cancellable, SchedulerError>
    where
        D: Send + 'static,
        F: FnOnce(D) + Send + 'static,
    {
        self.ensure_open()?;
        let cancellable = Cancellable::new();
        let task = cancellable.clone();
        let logger = Arc::clone(&self.inner.logger);
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            if task.is_cancelled() {
                return;
            }
            if catch_unwind(AssertUnwindSafe(move || callback(data))).is_err() {
                logger.error("scheduled task panicked");
            }
            task.finish();
        });
        cancellable.attach(handle);
        self.track(&cancellable);
        Ok(cancellable)
    }

    /// Fire `callback(&data)` after `initial_delay`, then every
    /// `interval` until cancelled.
    pub fn schedule<D, F>(
        &self,
        mut callback: F,
        data: D,
        initial_delay: Duration,
        interval: Duration,
    ) -> Result<Cancellable, SchedulerError>
    where
        D: Send + 'static,
        F: FnMut(&D) + Send + 'static,
    {
        self.ensure_open()?;
        let cancellable = Cancellable::new();
        let task = cancellable.clone();
        let logger = Arc::clone(&self.inner.logger);
        let handle = tokio::spawn(async move {
            sleep(initial_delay).await;
            loop {
                if task.is_cancelled() {
                    return;
                }
                if catch_unwind(AssertUnwindSafe(|| callback(&data))).is_err() {
                    logger.error("scheduled task panicked; schedule continues");
                }
                sleep(interval).await;
            }
        });
        cancellable.attach(handle);
        self.track(&cancellable);
        Ok(cancellable)
    }

    /// Cancel all outstanding tasks and refuse further scheduling.
    /// Idempotent.
    pub fn close(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let tasks = std::mem::take(&mut *self.inner.tasks.lock());
        for task in tasks {
            task.cancel();
        }
    }

    /// Whether the scheduler has been closed.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<(), SchedulerError> {
        if self.is_closed() {
            return Err(SchedulerError::Closed);
        }
        Ok(())
    }

    fn track(&self, cancellable: &Cancellable) {
        let mut tasks = self.inner.tasks.lock();
        tasks.retain(|task| !task.inner.finished.load(Ordering::Acquire));
        tasks.push(cancellable.clone());
    }
}
