//! The deferred result handle returned by protocol calls.

// Layer 1: Standard library imports
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

// Layer 2: Third-party crate imports
use tokio::sync::oneshot;

// Layer 3: Internal module imports
use super::fault::ActorFault;

/// A handle completed exactly once, by the dispatcher, with the handler's
/// value or a fault.
///
/// `Completes<T>` is a `Future`, so callers simply `.await` it:
///
/// ```rust,ignore
/// let value: i64 = counter.get_value().await?;
/// ```
///
/// Messages that are discarded before dispatch (for example under a
/// `DropOldest` overflow) resolve with [`ActorFault::Abandoned`]; messages
/// drained when an actor stops resolve with [`ActorFault::Stopped`].
#[derive(Debug)]
pub struct Completes<T> {
    state: CompletesState<T>,
}

#[derive(Debug)]
enum CompletesState<T> {
    Pending(oneshot::Receiver<Result<T, ActorFault>>),
    Ready(Option<Result<T, ActorFault>>),
}

impl<T: Send + 'static> Completes<T> {
    /// Open a deferred and the completer that drives it.
    pub(crate) fn open() -> (Completer<T>, Self) {
        let (tx, rx) = oneshot::channel();
        (
            Completer { tx: Some(tx) },
            Self {
                state: CompletesState::Pending(rx),
            },
        )
    }

    /// A deferred that is already resolved.
    pub fn resolved(value: T) -> Self {
        Self {
            state: CompletesState::Ready(Some(Ok(value))),
        }
    }

    /// A deferred that is already rejected.
    pub fn failed(fault: ActorFault) -> Self {
        Self {
            state: CompletesState::Ready(Some(Err(fault))),
        }
    }

    /// Await the outcome. Equivalent to awaiting the deferred itself.
    pub async fn outcome(self) -> Result<T, ActorFault> {
        self.await
    }

    /// Await the outcome with a deadline. Elapsing maps to
    /// [`ActorFault::Abandoned`].
    pub async fn outcome_within(self, deadline: Duration) -> Result<T, ActorFault> {
        match tokio::time::timeout(deadline, self).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ActorFault::Abandoned),
        }
    }
}

impl<T: Send + 'static> Future for Completes<T> {
    type Output = Result<T, ActorFault>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // SAFETY: `Completes` does not rely on pinning for any of its fields;
        // the inner oneshot receiver is re-pinned locally via `Pin::new` below.
        let this = unsafe { self.get_unchecked_mut() };
        match &mut this.state {
            CompletesState::Pending(rx) => match Pin::new(rx).poll(cx) {
                Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
                Poll::Ready(Err(_)) => Poll::Ready(Err(ActorFault::Abandoned)),
                Poll::Pending => Poll::Pending,
            },
            CompletesState::Ready(slot) => {
                Poll::Ready(slot.take().unwrap_or(Err(ActorFault::Abandoned)))
            }
        }
    }
}

/// The write side of a deferred. Owned by the envelope; used exactly once.
#[derive(Debug)]
pub(crate) struct Completer<T> {
    tx: Option<oneshot::Sender<Result<T, ActorFault>>>,
}

impl<T: Send + 'static> Completer<T> {
    /// Resolve the deferred with a value. A dropped reader is fine.
    pub(crate) fn resolve(mut self, value: T) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Ok(value));
        }
    }

    /// Reject the deferred with a fault. A dropped reader is fine.
    pub(crate) fn reject(mut self, fault: ActorFault) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(Err(fault));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_completes_the_future() {
        let (completer, completes) = Completes::<i32>::open();
        completer.resolve(42);
        assert_eq!(completes.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_reject_completes_with_fault() {
        let (completer, completes) = Completes::<i32>::open();
        completer.reject(ActorFault::MailboxOverflow);
        assert_eq!(completes.await.unwrap_err(), ActorFault::MailboxOverflow);
    }

    #[tokio::test]
    async fn test_dropped_completer_resolves_as_abandoned() {
        let (completer, completes) = Completes::<i32>::open();
        drop(completer);
        assert_eq!(completes.await.unwrap_err(), ActorFault::Abandoned);
    }

    #[tokio::test]
    async fn test_pre_completed_variants() {
        assert_eq!(Completes::resolved(7).await.unwrap(), 7);
        assert_eq!(
            Completes::<i32>::failed(ActorFault::Stopped).await.unwrap_err(),
            ActorFault::Stopped
        );
    }

    #[tokio::test]
    async fn test_outcome_within_times_out() {
        let (_completer, completes) = Completes::<i32>::open();
        let outcome = completes
            .outcome_within(Duration::from_millis(10))
            .await;
        assert_eq!(outcome.unwrap_err(), ActorFault::Abandoned);
    }

    #[tokio::test]
    async fn test_resolve_ignores_dropped_reader() {
        let (completer, completes) = Completes::<i32>::open();
        drop(completes);
        completer.resolve(1);
    }
}
