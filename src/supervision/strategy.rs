//! Supervision policy types.

// Layer 1: Standard library imports
use std::time::Duration;

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};

// Layer 3: Internal module imports
// (none)

/// Default restart intensity for user supervisors.
pub const DEFAULT_INTENSITY: u32 = 5;

/// Default restart intensity window.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(5);

/// The supervisor's decision for a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupervisionDirective {
    /// Keep the actor instance and its state; resume dispatch.
    Resume,

    /// Replace the actor instance; keep its address, mailbox, and
    /// environment.
    Restart,

    /// Stop the actor (scope decides whether siblings stop too).
    Stop,

    /// Hand the fault to the next supervisor in the chain.
    Escalate,
}

/// Which actors a `Stop` directive applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SupervisionScope {
    /// Only the failing actor.
    #[default]
    One,

    /// The failing actor and its siblings under the same supervisor.
    All,
}

/// Bound governing directive promotion.
///
/// When more than `intensity` restarts land within `period` for the same
/// supervised actor, a `Restart` decision is promoted to `Escalate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisionStrategy {
    /// Maximum restarts tolerated within the period.
    pub intensity: u32,

    /// The sliding window the intensity is measured over.
    pub period: Duration,

    /// Scope applied to `Stop` directives.
    pub scope: SupervisionScope,
}

impl SupervisionStrategy {
    /// Construct a strategy.
    pub fn new(intensity: u32, period: Duration, scope: SupervisionScope) -> Self {
        Self {
            intensity,
            period,
            scope,
        }
    }

    /// A strategy whose intensity window never exhausts.
    pub fn forever() -> Self {
        Self {
            intensity: u32::MAX,
            period: DEFAULT_PERIOD,
            scope: SupervisionScope::One,
        }
    }
}

impl Default for SupervisionStrategy {
    fn default() -> Self {
        Self {
            intensity: DEFAULT_INTENSITY,
            period: DEFAULT_PERIOD,
            scope: SupervisionScope::One,
        }
    }
}

/// How an actor is attached to its supervisor.
///
/// Unnamed links resolve to the stage's public root; named links resolve
/// through the supervisor registry, falling back to the public root when
/// the name is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SupervisorLink {
    /// Supervised by the public root.
    #[default]
    Default,

    /// Supervised by a registered, named supervisor.
    Named(String),
}
