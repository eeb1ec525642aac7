//! # stagehand - a stage-based actor runtime
//!
//! Independently-addressable actors, each owning private state, each
//! processing messages one at a time from its mailbox, each recovering
//! from faults under the direction of a supervisor. Callers interact with
//! actors through typed proxies whose results are delivered
//! asynchronously as [`Completes`](message::Completes) deferreds.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use async_trait::async_trait;
//! use stagehand::prelude::*;
//!
//! // 1. The actor: a plain struct with private state.
//! #[derive(Default)]
//! struct Counter {
//!     value: i64,
//! }
//!
//! #[async_trait]
//! impl Actor for Counter {}
//!
//! // 2. The protocol: an extension trait over the proxy.
//! trait CounterProtocol {
//!     fn increment(&self) -> Completes<()>;
//!     fn get_value(&self) -> Completes<i64>;
//! }
//!
//! impl CounterProtocol for Proxy<Counter> {
//!     fn increment(&self) -> Completes<()> {
//!         self.send_sync("increment", |actor, _| {
//!             actor.value += 1;
//!             Ok(())
//!         })
//!     }
//!
//!     fn get_value(&self) -> Completes<i64> {
//!         self.send_sync("get_value", |actor, _| Ok(actor.value))
//!     }
//! }
//!
//! // 3. A stage constructs and owns the actors.
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let stage = Stage::new(StageConfig::default());
//!     let counter = stage.actor_for(Definition::of("Counter", Counter::default))?;
//!
//!     counter.increment();
//!     counter.increment();
//!     let value = counter.get_value().await?;
//!     assert_eq!(value, 2);
//!
//!     stage.close().await;
//!     Ok(())
//! }
//! ```
//!
//! # Guarantees
//!
//! - Serialized, FIFO processing per actor: for two messages sent to the
//!   same actor in order, the first handler begins and completes before
//!   the second begins. No ordering across mailboxes.
//! - A deterministic lifecycle (`Constructed`, `Starting`, `Running`,
//!   `Suspended`, `Restarting`, `Stopping`, `Stopped`) whose hooks run in
//!   precise order; hook errors are logged and never block transitions.
//! - Supervision that isolates faults: a failing handler rejects the
//!   caller's deferred *and* informs the supervisor, which resumes,
//!   restarts, stops, or escalates within its intensity window.
//! - Backpressure through bounded mailboxes with `DropOldest`,
//!   `DropNewest`, and `Reject` overflow policies.
//! - Dead-letter routing for messages that can no longer be delivered,
//!   with synchronous listener broadcast.
//! - Orderly, hierarchical shutdown: children stop before their parent
//!   finishes stopping; [`Stage::close`](stage::Stage::close) walks user
//!   trees, then the root supervisors, then the scheduler.
//!
//! # Module Organization
//!
//! - [`actor`] - the `Actor` contract, environment, lifecycle, proxies
//! - [`mailbox`] - FIFO queues with suspension and overflow control
//! - [`message`] - envelopes, deferreds, and fault types
//! - [`supervision`] - strategies, directives, and supervisors
//! - [`stage`] - the runtime entry point and configuration
//! - [`directory`] - sharded address lookup
//! - [`dead_letters`] - the undeliverable-message sink
//! - [`scheduler`] - timed tasks with cancellation
//! - [`logging`] - the four-level logging contract
//! - [`testkit`] - deterministic waiting and observation helpers
//! - [`util`] - addresses

pub mod actor;
pub mod dead_letters;
pub mod directory;
pub mod logging;
pub mod mailbox;
pub mod message;
pub mod prelude;
pub mod scheduler;
pub mod stage;
pub mod supervision;
pub mod testkit;
pub mod util;

// Re-export commonly used types
pub use actor::{
    Actor, ActorContext, Definition, DefinitionInfo, ExecutionContext, LifeCycle, LifeCycleState,
    Proxy,
};
pub use dead_letters::{DeadLetter, DeadLetters, DeadLettersListener};
pub use directory::{Directory, DirectoryConfig, DirectoryStats};
pub use logging::{Logger, StandardLogger, TracingLogger};
pub use mailbox::{Mailbox, MailboxCapacity, MailboxConfig, OverflowPolicy};
pub use message::{ActorError, ActorFault, ActorResult, Completes};
pub use scheduler::{Cancellable, Scheduler, SchedulerError};
pub use stage::{Stage, StageConfig, StageError};
pub use supervision::{
    SupervisionDirective, SupervisionScope, SupervisionStrategy, Supervised, Supervisor,
    SupervisorLink,
};
pub use util::{Address, AddressFactory};
