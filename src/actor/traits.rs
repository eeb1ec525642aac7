//! The actor contract: lifecycle hooks over private state.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use super::context::ActorContext;
use crate::message::{ActorFault, ActorResult};

/// Behavior contract for actors.
///
/// An actor is a plain struct owning private state. Protocol methods reach
/// it as closures queued through its proxy, so this trait only carries the
/// lifecycle hooks. All hooks are optional; every hook receives the
/// actor's [`ActorContext`] (address, stage, children, logger, scheduler,
/// execution context).
///
/// Hook errors are logged with the hook name and never prevent the state
/// transition that owns the hook. Errors returned from protocol handlers
/// are different: they reject the caller's deferred and engage
/// supervision.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use stagehand::prelude::*;
///
/// #[derive(Default)]
/// struct Counter {
///     value: i64,
/// }
///
/// #[async_trait]
/// impl Actor for Counter {
///     async fn before_start(&mut self, context: &mut ActorContext<Self>) -> ActorResult<()> {
///         context.logger().info(&format!("counter {} starting", context.address()));
///         Ok(())
///     }
/// }
///
/// trait CounterProtocol {
///     fn increment(&self) -> Completes<()>;
///     fn get_value(&self) -> Completes<i64>;
/// }
///
/// impl CounterProtocol for Proxy<Counter> {
///     fn increment(&self) -> Completes<()> {
///         self.send_sync("increment", |actor, _| {
///             actor.value += 1;
///             Ok(())
///         })
///     }
///
///     fn get_value(&self) -> Completes<i64> {
///         self.send_sync("get_value", |actor, _| Ok(actor.value))
///     }
/// }
/// ```
#[async_trait]
pub trait Actor: Send + Sized + 'static {
    /// Runs while the actor transitions `Constructed -> Starting`, before
    /// any message is dispatched.
    async fn before_start(&mut self, context: &mut ActorContext<Self>) -> ActorResult<()> {
        let _ = context;
        Ok(())
    }

    /// Runs at the head of the shutdown sequence, before children stop.
    async fn before_stop(&mut self, context: &mut ActorContext<Self>) -> ActorResult<()> {
        let _ = context;
        Ok(())
    }

    /// Runs at the tail of the shutdown sequence, after the mailbox has
    /// been closed and every child has stopped.
    async fn after_stop(&mut self, context: &mut ActorContext<Self>) -> ActorResult<()> {
        let _ = context;
        Ok(())
    }

    /// Runs on the failing instance before it is replaced.
    async fn before_restart(
        &mut self,
        reason: &ActorFault,
        context: &mut ActorContext<Self>,
    ) -> ActorResult<()> {
        let _ = (reason, context);
        Ok(())
    }

    /// Runs on the replacement instance before dispatch resumes.
    async fn after_restart(
        &mut self,
        reason: &ActorFault,
        context: &mut ActorContext<Self>,
    ) -> ActorResult<()> {
        let _ = (reason, context);
        Ok(())
    }

    /// Runs when a supervisor resumes the actor after a fault, before the
    /// mailbox is resumed. State is preserved.
    async fn before_resume(
        &mut self,
        reason: &ActorFault,
        context: &mut ActorContext<Self>,
    ) -> ActorResult<()> {
        let _ = (reason, context);
        Ok(())
    }
}
