//! The per-actor environment handle passed to hooks and handlers.

// Layer 1: Standard library imports
use std::collections::HashMap;
use std::sync::Arc;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::cell::{ActorOps, CellShared, Children, ParentLink};
use super::definition::{Definition, DefinitionInfo};
use super::proxy::Proxy;
use super::traits::Actor;
use crate::dead_letters::DeadLetters;
use crate::logging::Logger;
use crate::scheduler::Scheduler;
use crate::stage::{Stage, StageError};
use crate::util::Address;

/// Small key/value map scoped to the current message.
///
/// The map is reset before every dispatch, so whatever a handler writes
/// here describes the in-flight message. Supervisors receive the map
/// as-of the failing message, which gives them named context (say,
/// `"command"` or `"request"`) without the runtime dictating a schema.
#[derive(Debug, Default, Clone)]
pub struct ExecutionContext {
    values: HashMap<String, String>,
}

impl ExecutionContext {
    /// Set a value for the current message.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Read a value set during the current message.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Remove everything (done by the dispatcher between messages).
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Whether any value is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copy of the current values.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.values.clone()
    }
}

/// The actor-side view of the runtime: address, stage services, parent
/// and children, the execution context, and the restart-surviving state
/// snapshot.
///
/// Exactly one context exists per actor; it lives as long as the actor's
/// cell and survives instance replacement on restart.
pub struct ActorContext<A: Actor> {
    stage: Stage,
    self_proxy: Proxy<A>,
    self_ops: Arc<dyn ActorOps>,
    shared: Arc<CellShared>,
    parent: Option<ParentLink>,
    children: Children,
    execution: ExecutionContext,
}

impl<A: Actor> ActorContext<A> {
    pub(crate) fn new(
        stage: Stage,
        self_proxy: Proxy<A>,
        self_ops: Arc<dyn ActorOps>,
        shared: Arc<CellShared>,
        parent: Option<ParentLink>,
    ) -> Self {
        Self {
            stage,
            self_proxy,
            self_ops,
            shared,
            parent,
            children: Children::default(),
            execution: ExecutionContext::default(),
        }
    }

    /// This actor's address.
    pub fn address(&self) -> &Address {
        &self.shared.address
    }

    /// The protocol type name this actor was defined with.
    pub fn protocol(&self) -> &str {
        self.shared.protocol()
    }

    /// The construction recipe this actor was created from.
    pub fn definition(&self) -> &DefinitionInfo {
        &self.shared.definition
    }

    /// The stage this actor lives on.
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// The stage's logger.
    pub fn logger(&self) -> Arc<dyn Logger> {
        self.stage.logger()
    }

    /// The stage's scheduler.
    pub fn scheduler(&self) -> &Scheduler {
        self.stage.scheduler()
    }

    /// The stage's dead-letters sink.
    pub fn dead_letters(&self) -> &DeadLetters {
        self.stage.dead_letters()
    }

    /// A proxy to this actor itself. Self-messaging through it is the
    /// idiomatic way to split work across mailbox turns.
    pub fn self_proxy(&self) -> Proxy<A> {
        self.self_proxy.clone()
    }

    /// The parent's address, when this actor was created as a child.
    pub fn parent_address(&self) -> Option<&Address> {
        self.parent.as_ref().map(|parent| parent.ops.address())
    }

    /// Addresses of the currently registered children.
    pub fn children_addresses(&self) -> Vec<Address> {
        self.children.addresses()
    }

    /// Create a child actor owned by this one. The child registers in
    /// this actor's child set when it reaches `Running` and is stopped as
    /// part of this actor's shutdown.
    pub fn child_actor_for<C: Actor>(
        &self,
        definition: Definition<C>,
    ) -> Result<Proxy<C>, StageError> {
        self.stage.spawn_child(
            definition,
            ParentLink {
                ops: Arc::clone(&self.self_ops),
                children: self.children.clone(),
            },
        )
    }

    /// The execution context of the in-flight message.
    pub fn execution(&self) -> &ExecutionContext {
        &self.execution
    }

    /// Mutable access to the execution context of the in-flight message.
    pub fn execution_mut(&mut self) -> &mut ExecutionContext {
        &mut self.execution
    }

    /// Store an opaque value that survives restarts of this actor.
    pub fn set_state_snapshot<V: Send + 'static>(&self, value: V) {
        self.shared.set_snapshot(Box::new(value));
    }

    /// Fetch the value stored by [`ActorContext::set_state_snapshot`], if
    /// any and if of the requested type.
    pub fn state_snapshot<V: Clone + Send + 'static>(&self) -> Option<V> {
        self.shared.snapshot_value::<V>()
    }

    pub(crate) fn self_ops(&self) -> Arc<dyn ActorOps> {
        Arc::clone(&self.self_ops)
    }

    pub(crate) fn parent(&self) -> Option<&ParentLink> {
        self.parent.as_ref()
    }

    pub(crate) fn children(&self) -> &Children {
        &self.children
    }
}
