//! The stage: entry point and owner of the runtime's shared services.

// Layer 1: Standard library imports
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, OnceLock};

// Layer 2: Third-party crate imports
use dashmap::DashMap;
use futures::future::join_all;
use parking_lot::Mutex;
use tokio::sync::mpsc;

// Layer 3: Internal module imports
use super::config::StageConfig;
use super::error::StageError;
use crate::actor::cell::{ActorCell, ActorOps, CellHandle, CellShared, Control, ParentLink, RootKind};
use crate::actor::context::ActorContext;
use crate::actor::definition::Definition;
use crate::actor::proxy::Proxy;
use crate::actor::traits::Actor;
use crate::dead_letters::DeadLetters;
use crate::directory::Directory;
use crate::logging::{Logger, TracingLogger};
use crate::mailbox::Mailbox;
use crate::scheduler::Scheduler;
use crate::supervision::roots::{PrivateRootSupervisor, PublicRootSupervisor};
use crate::supervision::strategy::SupervisorLink;
use crate::supervision::supervised::{Supervised, SupervisorRef};
use crate::supervision::traits::Supervisor;
use crate::util::{Address, AddressFactory};

/// Registry name of the public root supervisor.
pub(crate) const PUBLIC_ROOT: &str = "stage-public-root";

/// Registry name of the private root supervisor.
pub(crate) const PRIVATE_ROOT: &str = "stage-private-root";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StageState {
    Running,
    Closing,
    Closed,
}

struct RootHandles {
    public: Arc<dyn ActorOps>,
    private: Arc<dyn ActorOps>,
}

pub(crate) struct StageCore {
    config: StageConfig,
    logger: Arc<dyn Logger>,
    directory: Directory,
    dead_letters: DeadLetters,
    scheduler: Scheduler,
    address_factory: AddressFactory,
    supervisors: DashMap<String, SupervisorRef>,
    state: Mutex<StageState>,
    roots: OnceLock<RootHandles>,
}

impl StageCore {
    pub(crate) fn directory(&self) -> &Directory {
        &self.directory
    }

    pub(crate) fn dead_letters(&self) -> &DeadLetters {
        &self.dead_letters
    }

    /// Resolve the fallback chain for a failing actor: named supervisor,
    /// then the public root, then the private root, never the failing
    /// actor itself.
    pub(crate) fn supervision_chain(
        &self,
        link: &SupervisorLink,
        failing: &Address,
    ) -> VecDeque<SupervisorRef> {
        let mut chain: VecDeque<SupervisorRef> = VecDeque::new();
        if let SupervisorLink::Named(name) = link {
            if let Some(named) = self.supervisors.get(name) {
                chain.push_back(named.clone());
            }
        }
        for root_name in [PUBLIC_ROOT, PRIVATE_ROOT] {
            if let Some(root) = self.supervisors.get(root_name) {
                if !chain
                    .iter()
                    .any(|existing| existing.address() == root.address())
                {
                    chain.push_back(root.clone());
                }
            }
        }
        chain.retain(|handler| handler.address() != failing);
        chain
    }

    /// Add an actor to its supervisor's sibling set (scope `All`
    /// population). Unknown names fall back to the public root.
    pub(crate) fn enroll_supervised(
        &self,
        link: &SupervisorLink,
        ops: Arc<dyn ActorOps>,
    ) -> Option<SupervisorRef> {
        let resolved = match link {
            SupervisorLink::Named(name) => self
                .supervisors
                .get(name)
                .map(|named| named.clone())
                .or_else(|| self.supervisors.get(PUBLIC_ROOT).map(|root| root.clone())),
            SupervisorLink::Default => {
                self.supervisors.get(PUBLIC_ROOT).map(|root| root.clone())
            }
        };
        if let Some(supervisor) = &resolved {
            supervisor.siblings().add(ops);
        }
        resolved
    }

    fn spawn<A: Actor>(
        &self,
        stage: Stage,
        definition: Definition<A>,
        parent: Option<ParentLink>,
        root: Option<RootKind>,
    ) -> Proxy<A> {
        let address = definition
            .address()
            .copied()
            .unwrap_or_else(|| self.address_factory.unique());
        let mailbox_config = definition
            .mailbox()
            .copied()
            .unwrap_or(self.config.default_mailbox);

        let shared = Arc::new(CellShared::new(
            address,
            definition.info().resolved_at(address),
            parent.as_ref().map(|link| *link.ops.address()),
            root,
        ));
        let mailbox = Arc::new(Mailbox::new(mailbox_config));
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let ops: Arc<dyn ActorOps> = Arc::new(CellHandle {
            shared: Arc::clone(&shared),
            mailbox: Arc::clone(&mailbox),
            control: control_tx.clone(),
        });
        let proxy = Proxy::new(
            Arc::clone(&shared),
            Arc::clone(&mailbox),
            control_tx.clone(),
            Arc::clone(&ops),
            stage.clone(),
        );
        let context = ActorContext::new(
            stage,
            proxy.clone(),
            Arc::clone(&ops),
            Arc::clone(&shared),
            parent,
        );

        let actor = definition.instantiate();
        let instantiator = definition.instantiator();
        let link = definition.supervisor().clone();
        let cell = ActorCell::new(
            actor,
            context,
            instantiator,
            link,
            mailbox,
            control_rx,
            control_tx.clone(),
            shared,
        );
        tokio::spawn(cell.run());
        let _ = control_tx.send(Control::Start);
        proxy
    }
}

/// The runtime's entry point.
///
/// A stage owns the directory, dead letters, scheduler, default logger,
/// address factory, and the two root supervisors, and constructs every
/// actor that lives on it. Stages are cheap to clone (a handle to shared
/// state). A stage must be created inside a Tokio runtime.
///
/// For tests and embedded use, construct independent stages with
/// [`Stage::new`]; for convenience there is a process-wide
/// [`Stage::global`] singleton.
#[derive(Clone)]
pub struct Stage {
    core: Arc<StageCore>,
}

static GLOBAL_STAGE: OnceLock<Stage> = OnceLock::new();

impl Stage {
    /// Create an independent stage and bootstrap its root supervisors.
    pub fn new(config: StageConfig) -> Self {
        Self::with_logger(config, Arc::new(TracingLogger))
    }

    /// Create a stage with a specific logger implementation.
    pub fn with_logger(config: StageConfig, logger: Arc<dyn Logger>) -> Self {
        let core = Arc::new(StageCore {
            directory: Directory::new(config.directory),
            dead_letters: DeadLetters::new(Arc::clone(&logger)),
            scheduler: Scheduler::new(Arc::clone(&logger)),
            address_factory: AddressFactory::new(),
            supervisors: DashMap::new(),
            state: Mutex::new(StageState::Running),
            roots: OnceLock::new(),
            logger,
            config,
        });
        let stage = Self { core };
        stage.bootstrap_roots();
        stage
    }

    /// The process-wide convenience stage, created on first use with the
    /// default configuration.
    pub fn global() -> Self {
        GLOBAL_STAGE
            .get_or_init(|| Self::new(StageConfig::default()))
            .clone()
    }

    fn bootstrap_roots(&self) {
        let private = self.core.spawn(
            self.clone(),
            Definition::of(PRIVATE_ROOT, PrivateRootSupervisor::default),
            None,
            Some(RootKind::Private),
        );
        self.core.supervisors.insert(
            PRIVATE_ROOT.to_string(),
            supervisor_ref_for(PRIVATE_ROOT, &private),
        );

        let public = self.core.spawn(
            self.clone(),
            Definition::of(PUBLIC_ROOT, PublicRootSupervisor::default),
            None,
            Some(RootKind::Public),
        );
        self.core.supervisors.insert(
            PUBLIC_ROOT.to_string(),
            supervisor_ref_for(PUBLIC_ROOT, &public),
        );

        let _ = self.core.roots.set(RootHandles {
            public: public.ops(),
            private: private.ops(),
        });
    }

    /// Create an actor from a definition. The proxy is usable
    /// immediately; messages queue until the actor reaches `Running`.
    pub fn actor_for<A: Actor>(&self, definition: Definition<A>) -> Result<Proxy<A>, StageError> {
        self.ensure_open()?;
        Ok(self.core.spawn(self.clone(), definition, None, None))
    }

    /// Look up the proxy registered at an address.
    ///
    /// Returns nothing when no actor is registered there or the actor is
    /// stopping or stopped. Repeated lookups of one live address return
    /// the identical proxy instance.
    pub fn actor_of<A: Actor>(&self, address: &Address) -> Option<Proxy<A>> {
        let entry = self.core.directory.get(address)?;
        if entry.ops().state().is_stopping_or_stopped() {
            return None;
        }
        entry.proxy().downcast_ref::<Proxy<A>>().cloned()
    }

    /// Create and register a named supervisor. Actors defined with
    /// `supervised_by(name)` route their faults to it.
    pub fn register_supervisor<S: Supervisor>(
        &self,
        name: impl Into<String>,
        definition: Definition<S>,
    ) -> Result<Proxy<S>, StageError> {
        self.ensure_open()?;
        let name = name.into();
        if self.core.supervisors.contains_key(&name) {
            return Err(StageError::DuplicateSupervisor(name));
        }
        let proxy = self.core.spawn(self.clone(), definition, None, None);
        self.core
            .supervisors
            .insert(name.clone(), supervisor_ref_for(&name, &proxy));
        Ok(proxy)
    }

    /// Stop everything: user actor trees first, then the public root,
    /// then the private root, then the scheduler. Idempotent.
    pub async fn close(&self) {
        {
            let mut state = self.core.state.lock();
            if *state != StageState::Running {
                return;
            }
            *state = StageState::Closing;
        }

        let timeout = self.core.config.shutdown_timeout;
        let root_addresses: Vec<Address> = self
            .core
            .roots
            .get()
            .map(|roots| vec![*roots.public.address(), *roots.private.address()])
            .unwrap_or_default();
        let is_root = |address: &Address| root_addresses.contains(address);

        // Top-level user actors first; each shutdown cascades through its
        // children before the parent finishes.
        let tops: Vec<Arc<dyn ActorOps>> = self
            .core
            .directory
            .entries()
            .into_iter()
            .filter(|entry| {
                !is_root(entry.ops().address()) && entry.ops().parent_address().is_none()
            })
            .map(|entry| Arc::clone(entry.ops()))
            .collect();
        join_all(tops.iter().map(|ops| ops.stop(Some(timeout)))).await;

        // Anything still registered (orphans of already-gone parents).
        let rest: Vec<Arc<dyn ActorOps>> = self
            .core
            .directory
            .entries()
            .into_iter()
            .filter(|entry| !is_root(entry.ops().address()))
            .map(|entry| Arc::clone(entry.ops()))
            .collect();
        join_all(rest.iter().map(|ops| ops.stop(Some(timeout)))).await;

        if let Some(roots) = self.core.roots.get() {
            let _ = roots.public.stop(Some(timeout)).await;
            let _ = roots.private.stop(Some(timeout)).await;
        }

        // Supervisor refs hold proxies that point back at this stage;
        // dropping them here lets the core free once callers let go.
        self.core.supervisors.clear();

        self.core.scheduler.close();
        *self.core.state.lock() = StageState::Closed;
    }

    /// Whether `close` has completed.
    pub fn is_closed(&self) -> bool {
        *self.core.state.lock() == StageState::Closed
    }

    /// The stage configuration.
    pub fn config(&self) -> &StageConfig {
        &self.core.config
    }

    /// The stage logger.
    pub fn logger(&self) -> Arc<dyn Logger> {
        Arc::clone(&self.core.logger)
    }

    /// The dead-letters sink.
    pub fn dead_letters(&self) -> &DeadLetters {
        &self.core.dead_letters
    }

    /// The scheduler.
    pub fn scheduler(&self) -> &Scheduler {
        &self.core.scheduler
    }

    /// The directory.
    pub fn directory(&self) -> &Directory {
        &self.core.directory
    }

    /// The address factory.
    pub fn address_factory(&self) -> &AddressFactory {
        &self.core.address_factory
    }

    pub(crate) fn core(&self) -> &StageCore {
        &self.core
    }

    pub(crate) fn spawn_child<C: Actor>(
        &self,
        definition: Definition<C>,
        parent: ParentLink,
    ) -> Result<Proxy<C>, StageError> {
        self.ensure_open()?;
        Ok(self.core.spawn(self.clone(), definition, Some(parent), None))
    }

    fn ensure_open(&self) -> Result<(), StageError> {
        if *self.core.state.lock() != StageState::Running {
            return Err(StageError::Closed);
        }
        Ok(())
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("actors", &self.core.directory.size())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Wrap a supervisor proxy into the routing handle the fault path uses:
/// `inform` is delivered as an ordinary message on the supervisor's
/// mailbox, so supervision is serialized with its other work.
fn supervisor_ref_for<S: Supervisor>(name: &str, proxy: &Proxy<S>) -> SupervisorRef {
    let target = proxy.clone();
    let deliver = Arc::new(move |supervised: Supervised| {
        let _ = target.send::<(), _>("inform", move |actor, context| {
            Box::pin(async move { actor.inform(supervised, context).await })
        });
    });
    SupervisorRef::new(name, *proxy.address(), deliver)
}
