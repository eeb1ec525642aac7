//! The queued form of a protocol call.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use futures::future::BoxFuture;

// Layer 3: Internal module imports
use super::completes::Completes;
use super::fault::{ActorFault, ActorResult};
use crate::actor::context::ActorContext;
use crate::actor::traits::Actor;

/// What an envelope is asked to do when it leaves the queue.
pub(crate) enum Delivery<'a, A: Actor> {
    /// Invoke the handler against the live actor.
    Invoke {
        actor: &'a mut A,
        context: &'a mut ActorContext<A>,
    },

    /// Reject the caller's deferred without invoking anything (dead-letter
    /// and drain paths).
    Reject(ActorFault),
}

type RunFn<A> =
    Box<dyn for<'a> FnOnce(Delivery<'a, A>) -> Option<BoxFuture<'a, Result<(), ActorFault>>> + Send>;

/// A message bound to a deferred result, queued in an actor's mailbox.
///
/// The envelope erases the handler's argument and return types behind a
/// single closure so that one mailbox carries every protocol method of the
/// actor. Completion of the deferred happens inside the closure, which is
/// how the dispatcher remains the only writer.
pub(crate) struct Envelope<A: Actor> {
    /// The protocol method this message invokes.
    pub(crate) selector: &'static str,

    run: RunFn<A>,
}

impl<A: Actor> Envelope<A> {
    /// Package a call into an envelope plus the caller-visible deferred.
    pub(crate) fn new<R, F>(selector: &'static str, call: F) -> (Self, Completes<R>)
    where
        R: Send + 'static,
        F: for<'a> FnOnce(&'a mut A, &'a mut ActorContext<A>) -> BoxFuture<'a, ActorResult<R>>
            + Send
            + 'static,
    {
        let (completer, completes) = Completes::open();
        let run: RunFn<A> = Box::new(move |delivery| match delivery {
            Delivery::Invoke { actor, context } => Some(Box::pin(async move {
                match call(actor, context).await {
                    Ok(value) => {
                        completer.resolve(value);
                        Ok(())
                    }
                    Err(error) => {
                        let fault = ActorFault::handler(selector, &error);
                        completer.reject(fault.clone());
                        Err(fault)
                    }
                }
            })),
            Delivery::Reject(fault) => {
                completer.reject(fault);
                None
            }
        });

        (Self { selector, run }, completes)
    }

    /// Invoke the handler. The returned fault, if any, is the supervision
    /// trigger; the caller's deferred has already been completed.
    pub(crate) async fn deliver(
        self,
        actor: &mut A,
        context: &mut ActorContext<A>,
    ) -> Result<(), ActorFault> {
        match (self.run)(Delivery::Invoke { actor, context }) {
            Some(invocation) => invocation.await,
            None => Ok(()),
        }
    }

    /// Reject the caller's deferred without dispatching.
    pub(crate) fn reject(self, fault: ActorFault) {
        let _ = (self.run)(Delivery::Reject(fault));
    }
}
