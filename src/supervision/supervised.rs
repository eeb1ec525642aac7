//! The handle a supervisor acts through.

// Layer 1: Standard library imports
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;

// Layer 3: Internal module imports
use super::strategy::{SupervisionDirective, SupervisionScope, SupervisionStrategy};
use crate::actor::cell::ActorOps;
use crate::logging::Logger;
use crate::message::ActorFault;
use crate::util::Address;

/// Actors enrolled under one supervisor; the population a `Stop` with
/// scope `All` applies to.
#[derive(Default)]
pub(crate) struct Siblings {
    members: Mutex<Vec<Arc<dyn ActorOps>>>,
}

impl Siblings {
    pub(crate) fn add(&self, member: Arc<dyn ActorOps>) {
        self.members.lock().push(member);
    }

    pub(crate) fn remove(&self, address: &Address) {
        self.members
            .lock()
            .retain(|member| member.address() != address);
    }

    pub(crate) fn snapshot(&self) -> Vec<Arc<dyn ActorOps>> {
        self.members.lock().clone()
    }
}

/// Routing handle for one registered supervisor: delivers `inform` as an
/// ordinary message on the supervisor's mailbox, and owns the sibling set
/// of the actors it supervises.
#[derive(Clone)]
pub(crate) struct SupervisorRef {
    name: Arc<str>,
    address: Address,
    siblings: Arc<Siblings>,
    deliver: Arc<dyn Fn(Supervised) + Send + Sync>,
}

impl SupervisorRef {
    pub(crate) fn new(
        name: &str,
        address: Address,
        deliver: Arc<dyn Fn(Supervised) + Send + Sync>,
    ) -> Self {
        Self {
            name: Arc::from(name),
            address,
            siblings: Arc::new(Siblings::default()),
            deliver,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn address(&self) -> &Address {
        &self.address
    }

    pub(crate) fn siblings(&self) -> &Siblings {
        &self.siblings
    }

    pub(crate) fn inform(&self, supervised: Supervised) {
        (self.deliver)(supervised);
    }
}

impl fmt::Debug for SupervisorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupervisorRef")
            .field("name", &self.name)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// A faulted actor, as seen by its supervisor.
///
/// Exposes exactly the operations a supervisor may take: suspend, resume,
/// restart, stop (scoped), escalate, and the fault with its execution
/// context. [`Supervised::apply`] maps a [`SupervisionDirective`] onto
/// those operations.
pub struct Supervised {
    ops: Arc<dyn ActorOps>,
    fault: ActorFault,
    execution: HashMap<String, String>,
    handler: SupervisorRef,
    escalation: VecDeque<SupervisorRef>,
    logger: Arc<dyn Logger>,
}

impl Supervised {
    pub(crate) fn new(
        ops: Arc<dyn ActorOps>,
        fault: ActorFault,
        execution: HashMap<String, String>,
        handler: SupervisorRef,
        escalation: VecDeque<SupervisorRef>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            ops,
            fault,
            execution,
            handler,
            escalation,
            logger,
        }
    }

    /// The fault being supervised.
    pub fn fault(&self) -> &ActorFault {
        &self.fault
    }

    /// The failed actor's address.
    pub fn address(&self) -> &Address {
        self.ops.address()
    }

    /// The failed actor's protocol type name.
    pub fn protocol(&self) -> &str {
        self.ops.protocol()
    }

    /// The execution context as-of the failing message.
    pub fn execution_context(&self) -> &HashMap<String, String> {
        &self.execution
    }

    /// Restarts of the failed actor within the trailing `period`.
    pub fn restarts_within(&self, period: Duration) -> u32 {
        self.ops.restarts_within(period)
    }

    /// Whether another restart fits inside the strategy's intensity
    /// window.
    pub fn restart_permitted(&self, strategy: &SupervisionStrategy) -> bool {
        self.ops.restarts_within(strategy.period) < strategy.intensity
    }

    /// Halt dispatch of the failed actor (already done by the fault path;
    /// idempotent).
    pub fn suspend(&self) {
        self.ops.suspend();
    }

    /// Resume the failed actor: `before_resume` runs with the fault, then
    /// dispatch continues with state preserved.
    pub fn resume(&self) {
        self.ops.resume(Some(self.fault.clone()));
    }

    /// Restart the failed actor: the instance is replaced, the address,
    /// mailbox, and environment are kept.
    pub fn restart(&self) {
        self.ops.restart(self.fault.clone());
    }

    /// Stop the failed actor; with scope `All`, also stop its siblings
    /// under the handling supervisor.
    pub fn stop(&self, scope: SupervisionScope) {
        match scope {
            SupervisionScope::One => {
                let _ = self.ops.stop(None);
            }
            SupervisionScope::All => {
                let mut targets = self.handler.siblings().snapshot();
                if !targets
                    .iter()
                    .any(|member| member.address() == self.ops.address())
                {
                    targets.push(Arc::clone(&self.ops));
                }
                for target in targets {
                    let _ = target.stop(None);
                }
            }
        }
    }

    /// Hand the fault to the next supervisor in the fallback chain. At
    /// the end of the chain the fault is fatal: it is logged and the
    /// actor is stopped.
    pub fn escalate(mut self) {
        match self.escalation.pop_front() {
            Some(next) => {
                self.handler = next.clone();
                next.inform(self);
            }
            None => {
                self.logger.error(&format!(
                    "fault escalated beyond the root supervisor; stopping {}: {}",
                    self.ops.address(),
                    self.fault
                ));
                let _ = self.ops.stop(None);
            }
        }
    }

    /// Apply a directive under the given scope.
    pub fn apply(self, directive: SupervisionDirective, scope: SupervisionScope) {
        match directive {
            SupervisionDirective::Resume => self.resume(),
            SupervisionDirective::Restart => self.restart(),
            SupervisionDirective::Stop => self.stop(scope),
            SupervisionDirective::Escalate => self.escalate(),
        }
    }
}

impl fmt::Debug for Supervised {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervised")
            .field("address", self.ops.address())
            .field("protocol", &self.ops.protocol())
            .field("fault", &self.fault)
            .field("handler", &self.handler.name())
            .finish_non_exhaustive()
    }
}
