//! The actor cell: one task per actor, serialized dispatch, lifecycle
//! execution, and the fault path into supervision.

// Layer 1: Standard library imports
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

// Layer 2: Third-party crate imports
use futures::future::join_all;
use parking_lot::Mutex;
use tokio::sync::mpsc;

// Layer 3: Internal module imports
use super::context::ActorContext;
use super::definition::DefinitionInfo;
use super::lifecycle::{LifeCycle, LifeCycleState};
use super::traits::Actor;
use crate::dead_letters::DeadLetter;
use crate::directory::DirectoryEntry;
use crate::mailbox::Mailbox;
use crate::message::{ActorFault, Completer, Completes, Envelope};
use crate::supervision::strategy::SupervisorLink;
use crate::supervision::supervised::{Supervised, SupervisorRef};
use crate::util::Address;

/// Marks the two stage-owned root actors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RootKind {
    /// Default supervisor for user actors; restarts forever.
    Public,

    /// Supervisor of last resort; faults reaching it are fatal.
    Private,
}

/// Control messages processed with priority over user messages.
///
/// Control flows even while the mailbox is suspended, which is how stop
/// and supervision directives reach a faulted actor.
pub(crate) enum Control {
    /// Begin the lifecycle: run `before_start`, then `StartRunning`.
    Start,

    /// Enter `Running`: register with the directory, the parent's child
    /// set, and the supervisor's sibling set.
    StartRunning,

    /// Run the shutdown sequence, optionally bounded by a deadline.
    Stop {
        timeout: Option<Duration>,
        done: Completer<()>,
    },

    /// Resume dispatch, running `before_resume` when a fault is attached.
    Resume { reason: Option<ActorFault> },

    /// Replace the actor instance, keeping address, mailbox, and
    /// environment.
    Restart { reason: ActorFault },
}

/// State shared between the cell task, its proxy, and erased handles.
pub(crate) struct CellShared {
    pub(crate) address: Address,
    pub(crate) definition: DefinitionInfo,
    pub(crate) parent_address: Option<Address>,
    pub(crate) root: Option<RootKind>,
    lifecycle: Mutex<LifeCycle>,
    stop_waiters: Mutex<Vec<Completer<()>>>,
    snapshot: Mutex<Option<Box<dyn Any + Send>>>,
}

impl CellShared {
    pub(crate) fn new(
        address: Address,
        definition: DefinitionInfo,
        parent_address: Option<Address>,
        root: Option<RootKind>,
    ) -> Self {
        Self {
            address,
            definition,
            parent_address,
            root,
            lifecycle: Mutex::new(LifeCycle::new()),
            stop_waiters: Mutex::new(Vec::new()),
            snapshot: Mutex::new(None),
        }
    }

    pub(crate) fn protocol(&self) -> &str {
        self.definition.protocol()
    }

    pub(crate) fn state(&self) -> LifeCycleState {
        self.lifecycle.lock().state()
    }

    pub(crate) fn transition(&self, state: LifeCycleState) {
        self.lifecycle.lock().transition_to(state);
    }

    pub(crate) fn restarts_within(&self, period: Duration) -> u32 {
        self.lifecycle.lock().restarts_within(period)
    }

    /// Register a waiter for an in-flight stop. When the actor reached
    /// `Stopped` first the waiter is handed back for the caller to
    /// resolve. The state check happens under the waiter lock so no
    /// waiter can slip in after the final drain.
    pub(crate) fn push_stop_waiter(&self, waiter: Completer<()>) -> Option<Completer<()>> {
        let mut waiters = self.stop_waiters.lock();
        if self.state() == LifeCycleState::Stopped {
            return Some(waiter);
        }
        waiters.push(waiter);
        None
    }

    fn take_stop_waiters(&self) -> Vec<Completer<()>> {
        std::mem::take(&mut *self.stop_waiters.lock())
    }

    pub(crate) fn set_snapshot(&self, value: Box<dyn Any + Send>) {
        *self.snapshot.lock() = Some(value);
    }

    pub(crate) fn snapshot_value<V: Clone + Send + 'static>(&self) -> Option<V> {
        self.snapshot
            .lock()
            .as_ref()
            .and_then(|value| value.downcast_ref::<V>())
            .cloned()
    }
}

/// Type-erased control surface over one actor.
///
/// This is the runtime-internal view handed to supervisors, parents, and
/// the stage; it is deliberately not reachable through the public proxy
/// surface.
pub(crate) trait ActorOps: Send + Sync + 'static {
    fn address(&self) -> &Address;
    fn protocol(&self) -> &str;
    fn parent_address(&self) -> Option<&Address>;
    fn state(&self) -> LifeCycleState;
    fn suspend(&self);
    fn resume(&self, reason: Option<ActorFault>);
    fn restart(&self, reason: ActorFault);
    fn stop(&self, timeout: Option<Duration>) -> Completes<()>;
    fn restarts_within(&self, period: Duration) -> u32;
}

/// The concrete [`ActorOps`] implementation for an actor cell.
pub(crate) struct CellHandle<A: Actor> {
    pub(crate) shared: Arc<CellShared>,
    pub(crate) mailbox: Arc<Mailbox<Envelope<A>>>,
    pub(crate) control: mpsc::UnboundedSender<Control>,
}

impl<A: Actor> Clone for CellHandle<A> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            mailbox: Arc::clone(&self.mailbox),
            control: self.control.clone(),
        }
    }
}

impl<A: Actor> ActorOps for CellHandle<A> {
    fn address(&self) -> &Address {
        &self.shared.address
    }

    fn protocol(&self) -> &str {
        self.shared.protocol()
    }

    fn parent_address(&self) -> Option<&Address> {
        self.shared.parent_address.as_ref()
    }

    fn state(&self) -> LifeCycleState {
        self.shared.state()
    }

    fn suspend(&self) {
        self.mailbox.suspend();
    }

    fn resume(&self, reason: Option<ActorFault>) {
        let _ = self.control.send(Control::Resume { reason });
    }

    fn restart(&self, reason: ActorFault) {
        let _ = self.control.send(Control::Restart { reason });
    }

    fn stop(&self, timeout: Option<Duration>) -> Completes<()> {
        match self.shared.state() {
            LifeCycleState::Stopped => Completes::resolved(()),
            LifeCycleState::Stopping => {
                let (done, completes) = Completes::open();
                if let Some(raced) = self.shared.push_stop_waiter(done) {
                    raced.resolve(());
                }
                completes
            }
            _ => {
                let (done, completes) = Completes::open();
                match self.control.send(Control::Stop { timeout, done }) {
                    Ok(()) => completes,
                    // The cell task is gone, so the actor is stopped.
                    Err(_) => Completes::resolved(()),
                }
            }
        }
    }

    fn restarts_within(&self, period: Duration) -> u32 {
        self.shared.restarts_within(period)
    }
}

/// The set of live children owned by one actor.
#[derive(Default)]
pub(crate) struct ChildSet {
    members: Mutex<Vec<Arc<dyn ActorOps>>>,
}

/// Cheap handle to a child set, shared between a parent's context and the
/// cells of its children.
#[derive(Clone, Default)]
pub(crate) struct Children {
    set: Arc<ChildSet>,
}

impl Children {
    pub(crate) fn add(&self, child: Arc<dyn ActorOps>) {
        self.set.members.lock().push(child);
    }

    pub(crate) fn remove(&self, address: &Address) {
        self.set
            .members
            .lock()
            .retain(|child| child.address() != address);
    }

    pub(crate) fn snapshot(&self) -> Vec<Arc<dyn ActorOps>> {
        self.set.members.lock().clone()
    }

    pub(crate) fn addresses(&self) -> Vec<Address> {
        self.set
            .members
            .lock()
            .iter()
            .map(|child| *child.address())
            .collect()
    }
}

/// Back-link from a child to its parent: the parent's ops plus the child
/// set the child must leave when it stops. Ownership runs parent-to-child;
/// this link is the non-owning back-pointer.
#[derive(Clone)]
pub(crate) struct ParentLink {
    pub(crate) ops: Arc<dyn ActorOps>,
    pub(crate) children: Children,
}

enum Step {
    Control(Option<Control>),
    Dispatch,
    Recheck,
}

enum Flow {
    Continue,
    Halt,
}

/// One actor's executor: owns the instance, drains control with priority,
/// and dispatches at most one user message at a time.
pub(crate) struct ActorCell<A: Actor> {
    actor: A,
    context: ActorContext<A>,
    instantiator: Arc<dyn Fn() -> A + Send + Sync>,
    link: SupervisorLink,
    mailbox: Arc<Mailbox<Envelope<A>>>,
    control_rx: mpsc::UnboundedReceiver<Control>,
    control_tx: mpsc::UnboundedSender<Control>,
    shared: Arc<CellShared>,
    enrolled: Option<SupervisorRef>,
}

impl<A: Actor> ActorCell<A> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        actor: A,
        context: ActorContext<A>,
        instantiator: Arc<dyn Fn() -> A + Send + Sync>,
        link: SupervisorLink,
        mailbox: Arc<Mailbox<Envelope<A>>>,
        control_rx: mpsc::UnboundedReceiver<Control>,
        control_tx: mpsc::UnboundedSender<Control>,
        shared: Arc<CellShared>,
    ) -> Self {
        Self {
            actor,
            context,
            instantiator,
            link,
            mailbox,
            control_rx,
            control_tx,
            shared,
            enrolled: None,
        }
    }

    /// The cell's main loop. Control messages always win over user
    /// messages; a cooperative yield separates dispatch turns so one busy
    /// actor cannot monopolize the executor.
    pub(crate) async fn run(mut self) {
        loop {
            let dispatchable = self.shared.state().is_running() && self.mailbox.is_receivable();
            let step = if dispatchable {
                tokio::select! {
                    biased;
                    control = self.control_rx.recv() => Step::Control(control),
                    _ = std::future::ready(()) => Step::Dispatch,
                }
            } else {
                tokio::select! {
                    biased;
                    control = self.control_rx.recv() => Step::Control(control),
                    _ = self.mailbox.signalled() => Step::Recheck,
                }
            };

            match step {
                Step::Control(None) => break,
                Step::Control(Some(control)) => {
                    if let Flow::Halt = self.handle_control(control).await {
                        break;
                    }
                }
                Step::Dispatch => {
                    self.dispatch_one().await;
                    tokio::task::yield_now().await;
                }
                Step::Recheck => {}
            }
        }
    }

    async fn handle_control(&mut self, control: Control) -> Flow {
        match control {
            Control::Start => {
                if self.shared.state() != LifeCycleState::Constructed {
                    return Flow::Continue;
                }
                self.shared.transition(LifeCycleState::Starting);
                if let Err(error) = self.actor.before_start(&mut self.context).await {
                    self.log_hook_failure("before_start", &error.to_string());
                }
                let _ = self.control_tx.send(Control::StartRunning);
                Flow::Continue
            }

            Control::StartRunning => {
                if self.shared.state() != LifeCycleState::Starting {
                    return Flow::Continue;
                }
                self.shared.transition(LifeCycleState::Running);
                self.register();
                Flow::Continue
            }

            Control::Resume { reason } => {
                if self.shared.state().is_stopping_or_stopped() {
                    return Flow::Continue;
                }
                if let Some(fault) = reason {
                    if let Err(error) = self.actor.before_resume(&fault, &mut self.context).await {
                        self.log_hook_failure("before_resume", &error.to_string());
                    }
                }
                self.shared.transition(LifeCycleState::Running);
                self.mailbox.resume();
                Flow::Continue
            }

            Control::Restart { reason } => {
                if !matches!(
                    self.shared.state(),
                    LifeCycleState::Running | LifeCycleState::Suspended
                ) {
                    return Flow::Continue;
                }
                self.shared.transition(LifeCycleState::Restarting);
                self.mailbox.suspend();
                if let Err(error) = self.actor.before_restart(&reason, &mut self.context).await {
                    self.log_hook_failure("before_restart", &error.to_string());
                }
                self.actor = (self.instantiator)();
                if let Err(error) = self.actor.after_restart(&reason, &mut self.context).await {
                    self.log_hook_failure("after_restart", &error.to_string());
                }
                self.shared.transition(LifeCycleState::Running);
                self.mailbox.resume();
                Flow::Continue
            }

            Control::Stop { timeout, done } => match self.shared.state() {
                LifeCycleState::Stopped => {
                    done.resolve(());
                    Flow::Continue
                }
                LifeCycleState::Stopping => {
                    if let Some(raced) = self.shared.push_stop_waiter(done) {
                        raced.resolve(());
                    }
                    Flow::Continue
                }
                _ => {
                    self.shutdown(timeout, done).await;
                    Flow::Halt
                }
            },
        }
    }

    /// Running entry: directory, parent's child set, sibling enrollment.
    fn register(&mut self) {
        let entry = DirectoryEntry::new(
            Arc::new(self.context.self_proxy()) as Arc<dyn Any + Send + Sync>,
            self.context.self_ops(),
        );
        let stage = self.context.stage().clone();
        stage.core().directory().put(&self.shared.address, entry);
        if let Some(parent) = self.context.parent() {
            parent.children.add(self.context.self_ops());
        }
        if self.shared.root.is_none() {
            self.enrolled = stage
                .core()
                .enroll_supervised(&self.link, self.context.self_ops());
        }
    }

    async fn dispatch_one(&mut self) {
        let Some(envelope) = self.mailbox.take_next() else {
            return;
        };
        self.context.execution_mut().clear();
        if let Err(fault) = envelope.deliver(&mut self.actor, &mut self.context).await {
            self.on_handler_fault(fault);
        }
    }

    /// The fault path: suspend, snapshot the execution context, and hand
    /// the fault to the supervisor chain. Supervision itself runs as an
    /// ordinary message on the supervisor's mailbox.
    fn on_handler_fault(&mut self, fault: ActorFault) {
        self.mailbox.suspend();
        self.shared.transition(LifeCycleState::Suspended);

        let stage = self.context.stage().clone();
        let logger = stage.logger();

        if self.shared.root == Some(RootKind::Private) {
            logger.error(&format!(
                "fault in the private root is fatal to the stage: {fault}"
            ));
            let _ = self.context.self_ops().stop(None);
            return;
        }

        let execution = self.context.execution().snapshot();
        let mut chain = stage
            .core()
            .supervision_chain(&self.link, &self.shared.address);
        match chain.pop_front() {
            Some(handler) => {
                let supervised = Supervised::new(
                    self.context.self_ops(),
                    fault,
                    execution,
                    handler.clone(),
                    chain,
                    logger,
                );
                handler.inform(supervised);
            }
            None => {
                logger.error(&format!(
                    "no supervisor reachable for {}; stopping after: {fault}",
                    self.shared.address
                ));
                let _ = self.context.self_ops().stop(None);
            }
        }
    }

    async fn shutdown(&mut self, timeout: Option<Duration>, done: Completer<()>) {
        self.shared.transition(LifeCycleState::Stopping);
        self.mailbox.suspend();

        let deadline = timeout.filter(|limit| !limit.is_zero());
        let outcome = match deadline {
            Some(limit) => match tokio::time::timeout(limit, self.shutdown_sequence()).await {
                Ok(()) => Ok(()),
                Err(_) => Err(ActorFault::StopTimeout {
                    timeout_ms: limit.as_millis() as u64,
                }),
            },
            None => {
                self.shutdown_sequence().await;
                Ok(())
            }
        };

        if outcome.is_err() {
            // Deadline elapsed mid-sequence: force-close the mailbox.
            // Children still stopping finish on their own tasks.
            self.drain_mailbox();
        }

        self.finalize();

        match outcome {
            Ok(()) => done.resolve(()),
            Err(fault) => done.reject(fault),
        }
    }

    async fn shutdown_sequence(&mut self) {
        if let Err(error) = self.actor.before_stop(&mut self.context).await {
            self.log_hook_failure("before_stop", &error.to_string());
        }

        let children = self.context.children().snapshot();
        let stops: Vec<Completes<()>> = children.iter().map(|child| child.stop(None)).collect();
        join_all(stops).await;

        self.drain_mailbox();

        if let Err(error) = self.actor.after_stop(&mut self.context).await {
            self.log_hook_failure("after_stop", &error.to_string());
        }
    }

    fn drain_mailbox(&self) {
        let stage = self.context.stage();
        for envelope in self.mailbox.close() {
            stage.dead_letters().failed_delivery(DeadLetter::undelivered(
                self.shared.address,
                format!("{}::{}", self.shared.protocol(), envelope.selector),
                "actor stopped",
            ));
            envelope.reject(ActorFault::Stopped);
        }
    }

    /// Stopped entry: leave every index, then release stop waiters.
    fn finalize(&mut self) {
        let stage = self.context.stage().clone();
        stage.core().directory().remove(&self.shared.address);
        if let Some(parent) = self.context.parent() {
            parent.children.remove(&self.shared.address);
        }
        if let Some(enrolled) = self.enrolled.take() {
            enrolled.siblings().remove(&self.shared.address);
        }

        // Stops queued behind this one resolve now; other late control
        // messages are meaningless once stopped.
        self.control_rx.close();
        while let Ok(control) = self.control_rx.try_recv() {
            if let Control::Stop { done, .. } = control {
                done.resolve(());
            }
        }

        self.shared.transition(LifeCycleState::Stopped);
        for waiter in self.shared.take_stop_waiters() {
            waiter.resolve(());
        }
    }

    fn log_hook_failure(&self, hook: &str, error: &str) {
        self.context.stage().logger().error(&format!(
            "actor {} ({}) hook `{hook}` failed: {error}",
            self.shared.address,
            self.shared.protocol()
        ));
    }
}
