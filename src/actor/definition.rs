//! Construction recipes for actors.

// Layer 1: Standard library imports
use std::fmt;
use std::sync::Arc;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::traits::Actor;
use crate::mailbox::MailboxConfig;
use crate::supervision::strategy::SupervisorLink;
use crate::util::Address;

/// Construction recipe for an actor: a protocol type name, an
/// instantiator, and placement options.
///
/// The instantiator captures whatever constructor parameters the actor
/// needs and is invoked once at creation and once per restart, so a
/// restarted actor always begins from the same initial state bound to the
/// same address, mailbox, and environment.
///
/// ```rust,ignore
/// let definition = Definition::of("Counter", || Counter::default())
///     .with_mailbox(MailboxConfig::bounded(64, OverflowPolicy::Reject))
///     .supervised_by("counter-supervisor");
/// let counter = stage.actor_for(definition)?;
/// ```
pub struct Definition<A: Actor> {
    protocol: String,
    instantiator: Arc<dyn Fn() -> A + Send + Sync>,
    address: Option<Address>,
    parameters: Vec<String>,
    mailbox: Option<MailboxConfig>,
    supervisor: SupervisorLink,
}

impl<A: Actor> Definition<A> {
    /// A definition for the given protocol type name and instantiator.
    pub fn of<F>(protocol: impl Into<String>, instantiator: F) -> Self
    where
        F: Fn() -> A + Send + Sync + 'static,
    {
        Self {
            protocol: protocol.into(),
            instantiator: Arc::new(instantiator),
            address: None,
            parameters: Vec::new(),
            mailbox: None,
            supervisor: SupervisorLink::Default,
        }
    }

    /// Pin the actor to a specific address instead of a minted one.
    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    /// Record the constructor parameters, in order. The values the
    /// instantiator captures stay opaque; this list is the readable form
    /// surfaced through the `definition()` accessors.
    pub fn with_parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters = parameters.into_iter().map(Into::into).collect();
        self
    }

    /// Use a specific mailbox configuration instead of the stage default.
    pub fn with_mailbox(mut self, mailbox: MailboxConfig) -> Self {
        self.mailbox = Some(mailbox);
        self
    }

    /// Attach the actor to a named supervisor instead of the public root.
    pub fn supervised_by(mut self, supervisor: impl Into<String>) -> Self {
        self.supervisor = SupervisorLink::Named(supervisor.into());
        self
    }

    /// The protocol type name.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// The intended address, if pinned.
    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    /// The mailbox configuration, if set.
    pub fn mailbox(&self) -> Option<&MailboxConfig> {
        self.mailbox.as_ref()
    }

    /// The recorded constructor parameters.
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// The supervisor link.
    pub fn supervisor(&self) -> &SupervisorLink {
        &self.supervisor
    }

    /// Descriptive view of this recipe, detached from the actor type.
    pub fn info(&self) -> DefinitionInfo {
        DefinitionInfo {
            protocol: self.protocol.clone(),
            address: self.address,
            parameters: self.parameters.clone(),
        }
    }

    /// Build a fresh actor instance.
    pub(crate) fn instantiate(&self) -> A {
        (self.instantiator)()
    }

    /// Share the instantiator (kept by the cell for restarts).
    pub(crate) fn instantiator(&self) -> Arc<dyn Fn() -> A + Send + Sync> {
        Arc::clone(&self.instantiator)
    }
}

impl<A: Actor> fmt::Debug for Definition<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("protocol", &self.protocol)
            .field("address", &self.address)
            .field("parameters", &self.parameters)
            .field("mailbox", &self.mailbox)
            .field("supervisor", &self.supervisor)
            .finish_non_exhaustive()
    }
}

/// Descriptive form of a [`Definition`]: the protocol type name, the
/// intended address, and the recorded constructor parameters.
///
/// This is what the proxy's and environment's `definition()` accessors
/// answer; the instantiator itself stays private to the runtime. Once an
/// actor exists, `address` holds the address it actually received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionInfo {
    protocol: String,
    address: Option<Address>,
    parameters: Vec<String>,
}

impl DefinitionInfo {
    /// The protocol type name.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// The intended address: pinned in the recipe, or the minted one once
    /// the actor has been constructed.
    pub fn address(&self) -> Option<&Address> {
        self.address.as_ref()
    }

    /// The recorded constructor parameters, in order.
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub(crate) fn resolved_at(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }
}
