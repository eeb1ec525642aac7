//! Convenient imports for building on the runtime.
//!
//! ```rust
//! use stagehand::prelude::*;
//! ```

pub use crate::actor::{Actor, ActorContext, Definition, DefinitionInfo, Proxy};
pub use crate::dead_letters::{DeadLetter, DeadLettersListener};
pub use crate::logging::Logger;
pub use crate::mailbox::{MailboxConfig, OverflowPolicy};
pub use crate::message::{ActorError, ActorFault, ActorResult, Completes};
pub use crate::stage::{Stage, StageConfig, StageError};
pub use crate::supervision::{
    SupervisionDirective, SupervisionScope, SupervisionStrategy, Supervised, Supervisor,
};
pub use crate::util::Address;
