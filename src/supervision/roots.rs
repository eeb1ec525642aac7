//! The stage's two root supervisors.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use async_trait::async_trait;

// Layer 3: Internal module imports
use super::strategy::{SupervisionDirective, SupervisionScope, SupervisionStrategy};
use super::supervised::Supervised;
use super::traits::Supervisor;
use crate::actor::context::ActorContext;
use crate::actor::traits::Actor;
use crate::message::ActorResult;

/// Default supervisor for every user actor: restart, forever.
#[derive(Debug, Default)]
pub(crate) struct PublicRootSupervisor;

#[async_trait]
impl Actor for PublicRootSupervisor {}

#[async_trait]
impl Supervisor for PublicRootSupervisor {
    fn strategy(&self) -> SupervisionStrategy {
        SupervisionStrategy::forever()
    }
}

/// Supervisor of last resort. Anything that reaches it stops, and the
/// event is surfaced as an error.
#[derive(Debug, Default)]
pub(crate) struct PrivateRootSupervisor;

#[async_trait]
impl Actor for PrivateRootSupervisor {}

#[async_trait]
impl Supervisor for PrivateRootSupervisor {
    fn decide(&self, _fault: &crate::message::ActorFault) -> SupervisionDirective {
        SupervisionDirective::Stop
    }

    async fn inform(
        &mut self,
        supervised: Supervised,
        context: &mut ActorContext<Self>,
    ) -> ActorResult<()> {
        context.logger().error(&format!(
            "fault reached the private root; stopping {}: {}",
            supervised.address(),
            supervised.fault()
        ));
        supervised.apply(SupervisionDirective::Stop, SupervisionScope::One);
        Ok(())
    }
}
