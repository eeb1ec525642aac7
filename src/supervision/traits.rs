//! The supervisor contract.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use super::strategy::{SupervisionDirective, SupervisionStrategy};
use super::supervised::Supervised;
use crate::actor::context::ActorContext;
use crate::actor::traits::Actor;
use crate::message::{ActorFault, ActorResult};

/// An actor that reacts to other actors' faults.
///
/// Supervisors are ordinary actors; `inform` is delivered as a message on
/// the supervisor's mailbox, so supervision logic is serialized with
/// whatever else the supervisor does.
///
/// The default `inform` consults [`Supervisor::decide`], promotes
/// `Restart` to `Escalate` once the strategy's intensity window is
/// exhausted, and applies the result. Overrides may attach diagnostics,
/// but must eventually either apply a directive through the
/// [`Supervised`] handle or escalate. An `inform` that itself returns an
/// error faults the supervisor actor, which is then handled by *its*
/// supervisor.
#[async_trait]
pub trait Supervisor: Actor {
    /// The strategy bounding this supervisor's restart decisions.
    fn strategy(&self) -> SupervisionStrategy {
        SupervisionStrategy::default()
    }

    /// Choose a directive for a fault. The default restarts on any error.
    fn decide(&self, fault: &ActorFault) -> SupervisionDirective {
        let _ = fault;
        SupervisionDirective::Restart
    }

    /// React to a supervised actor's fault.
    async fn inform(
        &mut self,
        supervised: Supervised,
        context: &mut ActorContext<Self>,
    ) -> ActorResult<()> {
        let strategy = self.strategy();
        let mut directive = self.decide(supervised.fault());
        if directive == SupervisionDirective::Restart && !supervised.restart_permitted(&strategy) {
            directive = SupervisionDirective::Escalate;
        }
        context.logger().info(&format!(
            "supervisor `{}` applying {:?} to {} after: {}",
            context.protocol(),
            directive,
            supervised.address(),
            supervised.fault()
        ));
        supervised.apply(directive, strategy.scope);
        Ok(())
    }
}
