//! Actors, their environment, lifecycle, and proxies.
//!
//! An actor is a plain struct implementing [`Actor`] (lifecycle hooks
//! only). Callers reach it through a typed [`Proxy`], whose protocol
//! methods are written as extension traits that package closures into
//! mailbox messages. The per-actor [`ActorContext`] is the environment:
//! address, stage services, parent/children, execution context, and the
//! restart-surviving state snapshot.
//!
//! Implementation layout:
//! - `traits.rs` - the `Actor` hook contract
//! - `lifecycle.rs` - the lifecycle state machine
//! - `definition.rs` - construction recipes
//! - `context.rs` - the environment handle
//! - `proxy.rs` - the caller-facing handle
//! - `cell.rs` - the per-actor executor (crate-private)

pub mod context;
pub mod definition;
pub mod lifecycle;
pub mod proxy;
pub mod traits;

pub(crate) mod cell;

pub use context::{ActorContext, ExecutionContext};
pub use definition::{Definition, DefinitionInfo};
pub use lifecycle::{LifeCycle, LifeCycleState};
pub use proxy::Proxy;
pub use traits::Actor;
