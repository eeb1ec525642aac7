//! The caller-facing handle that turns protocol calls into messages.

// Layer 1: Standard library imports
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use futures::future::BoxFuture;
use tokio::sync::mpsc;

// Layer 3: Internal module imports
use super::cell::{ActorOps, CellShared, Control};
use super::context::ActorContext;
use super::definition::DefinitionInfo;
use super::traits::Actor;
use crate::dead_letters::{DeadLetter, DeadLetters};
use crate::logging::Logger;
use crate::mailbox::{Mailbox, SendOutcome};
use crate::message::{ActorFault, ActorResult, Completes, Envelope};
use crate::scheduler::Scheduler;
use crate::stage::Stage;
use crate::util::Address;

struct ProxyInner<A: Actor> {
    shared: Arc<CellShared>,
    mailbox: Arc<Mailbox<Envelope<A>>>,
    control: mpsc::UnboundedSender<Control>,
    ops: Arc<dyn ActorOps>,
    stage: Stage,
}

/// Typed handle to one actor.
///
/// Protocol methods are written as extension traits over `Proxy<A>`: each
/// method packages a selector and a closure over the actor into a mailbox
/// message and returns the caller's [`Completes`] deferred. Operational
/// methods answer synchronously without touching the mailbox. The proxy
/// does not expose the actor's environment; runtime internals reach it
/// through crate-private paths only.
///
/// Proxies are cheap to clone, and lookups through the stage for the same
/// address return the same proxy instance (see [`Proxy::ptr_eq`]).
pub struct Proxy<A: Actor> {
    inner: Arc<ProxyInner<A>>,
}

impl<A: Actor> Clone for Proxy<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: Actor> Proxy<A> {
    pub(crate) fn new(
        shared: Arc<CellShared>,
        mailbox: Arc<Mailbox<Envelope<A>>>,
        control: mpsc::UnboundedSender<Control>,
        ops: Arc<dyn ActorOps>,
        stage: Stage,
    ) -> Self {
        Self {
            inner: Arc::new(ProxyInner {
                shared,
                mailbox,
                control,
                ops,
                stage,
            }),
        }
    }

    /// Send a protocol call with an async handler body.
    ///
    /// The `selector` names the protocol method (it appears in fault
    /// messages and dead letters). The closure runs inside the actor's
    /// dispatch turn with exclusive access to the instance.
    pub fn send<R, F>(&self, selector: &'static str, call: F) -> Completes<R>
    where
        R: Send + 'static,
        F: for<'a> FnOnce(&'a mut A, &'a mut ActorContext<A>) -> BoxFuture<'a, ActorResult<R>>
            + Send
            + 'static,
    {
        let (envelope, completes) = Envelope::new(selector, call);
        self.deliver(envelope);
        completes
    }

    /// Send a protocol call with a synchronous handler body.
    pub fn send_sync<R, F>(&self, selector: &'static str, call: F) -> Completes<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut A, &mut ActorContext<A>) -> ActorResult<R> + Send + 'static,
    {
        self.send(selector, move |actor, context| {
            let outcome = call(actor, context);
            Box::pin(async move { outcome })
        })
    }

    fn deliver(&self, envelope: Envelope<A>) {
        match self.inner.mailbox.offer(envelope) {
            SendOutcome::Enqueued => {}
            // Overflow-discarded deferreds resolve as abandoned when the
            // envelope drops; only Reject and Closed produce dead letters.
            SendOutcome::DroppedOldest(displaced) => drop(displaced),
            SendOutcome::DroppedNewest(incoming) => drop(incoming),
            SendOutcome::Rejected(incoming) => {
                self.dead_letters().failed_delivery(DeadLetter::undelivered(
                    self.inner.shared.address,
                    self.representation(incoming.selector),
                    "mailbox overflow",
                ));
                incoming.reject(ActorFault::MailboxOverflow);
            }
            SendOutcome::Closed(incoming) => {
                self.dead_letters().failed_delivery(DeadLetter::undelivered(
                    self.inner.shared.address,
                    self.representation(incoming.selector),
                    "actor stopped",
                ));
                incoming.reject(ActorFault::Stopped);
            }
        }
    }

    fn representation(&self, selector: &str) -> String {
        format!("{}::{}", self.inner.shared.protocol(), selector)
    }

    /// This actor's address.
    pub fn address(&self) -> &Address {
        &self.inner.shared.address
    }

    /// The stage this actor lives on.
    pub fn stage(&self) -> &Stage {
        &self.inner.stage
    }

    /// The protocol type name from the actor's definition.
    pub fn protocol(&self) -> &str {
        self.inner.shared.protocol()
    }

    /// The construction recipe this actor was created from: protocol type
    /// name, the address it received, and the recorded constructor
    /// parameters. Answered synchronously without touching the mailbox.
    pub fn definition(&self) -> &DefinitionInfo {
        &self.inner.shared.definition
    }

    /// Whether the actor has reached its terminal state.
    pub fn is_stopped(&self) -> bool {
        self.inner.shared.state().is_terminal()
    }

    /// The stage's logger.
    pub fn logger(&self) -> Arc<dyn Logger> {
        self.inner.stage.logger()
    }

    /// The stage's dead-letters sink.
    pub fn dead_letters(&self) -> &DeadLetters {
        self.inner.stage.dead_letters()
    }

    /// The stage's scheduler.
    pub fn scheduler(&self) -> &Scheduler {
        self.inner.stage.scheduler()
    }

    /// Enqueue the start control. Actors are started when created, so
    /// this is a no-op for anything past `Constructed`.
    pub fn start(&self) {
        let _ = self.inner.control.send(Control::Start);
    }

    /// Stop the actor. Resolves once the shutdown sequence has finished;
    /// stopping an already stopped actor resolves immediately.
    pub fn stop(&self) -> Completes<()> {
        self.inner.ops.stop(None)
    }

    /// Stop with a deadline. If the shutdown sequence does not finish in
    /// time the mailbox is force-closed and the deferred rejects with
    /// [`ActorFault::StopTimeout`]. A zero deadline means no deadline.
    pub fn stop_within(&self, timeout: Duration) -> Completes<()> {
        self.inner.ops.stop(Some(timeout))
    }

    /// Request a restart: the instance is replaced, the address, mailbox,
    /// and environment are kept.
    pub fn restart(&self) {
        self.inner.ops.restart(ActorFault::RestartRequested);
    }

    /// Whether two proxies are literally the same instance (the identity
    /// the stage guarantees for repeated lookups of one address).
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn ops(&self) -> Arc<dyn ActorOps> {
        Arc::clone(&self.inner.ops)
    }

    pub(crate) fn mailbox(&self) -> &Mailbox<Envelope<A>> {
        &self.inner.mailbox
    }
}

impl<A: Actor> PartialEq for Proxy<A> {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl<A: Actor> Eq for Proxy<A> {}

impl<A: Actor> Hash for Proxy<A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

impl<A: Actor> fmt::Debug for Proxy<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("protocol", &self.protocol())
            .field("address", self.address())
            .finish()
    }
}

impl<A: Actor> fmt::Display for Proxy<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.protocol(), self.address())
    }
}
