//! Supervision: strategies, directives, and the supervisor contract.
//!
//! When a message handler fails, the dispatcher suspends the actor and
//! informs its supervisor through the fallback chain
//! (named supervisor, then the public root, then the private root). The
//! supervisor decides a [`SupervisionDirective`] bounded by its
//! [`SupervisionStrategy`] and applies it through the [`Supervised`]
//! handle.

pub mod strategy;
pub mod supervised;
pub mod traits;

pub(crate) mod roots;

pub use strategy::{
    SupervisionDirective, SupervisionScope, SupervisionStrategy, SupervisorLink,
    DEFAULT_INTENSITY, DEFAULT_PERIOD,
};
pub use supervised::Supervised;
pub use traits::Supervisor;
