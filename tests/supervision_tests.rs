//! Supervision directives observed end to end: restart, resume, stop,
//! escalation through the intensity window, and scope `All`.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use stagehand::logging::Logger;
use stagehand::prelude::*;
use stagehand::testkit::{self, CapturingDeadLetters, CapturingLogger, ObservableState};

struct Counter {
    value: i64,
    events: ObservableState<Vec<String>>,
}

#[async_trait]
impl Actor for Counter {
    async fn before_restart(
        &mut self,
        _reason: &ActorFault,
        _context: &mut ActorContext<Self>,
    ) -> ActorResult<()> {
        self.events
            .update(|log| log.push("before_restart".to_string()));
        Ok(())
    }

    async fn after_restart(
        &mut self,
        _reason: &ActorFault,
        _context: &mut ActorContext<Self>,
    ) -> ActorResult<()> {
        self.events
            .update(|log| log.push("after_restart".to_string()));
        Ok(())
    }

    async fn before_resume(
        &mut self,
        _reason: &ActorFault,
        _context: &mut ActorContext<Self>,
    ) -> ActorResult<()> {
        self.events
            .update(|log| log.push("before_resume".to_string()));
        Ok(())
    }
}

trait CounterProtocol {
    fn increment(&self) -> Completes<()>;
    fn get_value(&self) -> Completes<i64>;
    fn cause_error(&self) -> Completes<()>;
}

impl CounterProtocol for Proxy<Counter> {
    fn increment(&self) -> Completes<()> {
        self.send_sync("increment", |actor, _| {
            actor.value += 1;
            Ok(())
        })
    }

    fn get_value(&self) -> Completes<i64> {
        self.send_sync("get_value", |actor, _| Ok(actor.value))
    }

    fn cause_error(&self) -> Completes<()> {
        self.send_sync("cause_error", |_, context| {
            context.execution_mut().set("command", "cause_error");
            Err(ActorError::message("intentional failure"))
        })
    }
}

fn counter_definition(
    events: &ObservableState<Vec<String>>,
    supervisor: &str,
) -> Definition<Counter> {
    let events = events.clone();
    Definition::of("Counter", move || Counter {
        value: 0,
        events: events.clone(),
    })
    .supervised_by(supervisor)
}

#[derive(Default)]
struct RestartingSupervisor;

#[async_trait]
impl Actor for RestartingSupervisor {}

#[async_trait]
impl Supervisor for RestartingSupervisor {}

#[derive(Default)]
struct ResumingSupervisor;

#[async_trait]
impl Actor for ResumingSupervisor {}

#[async_trait]
impl Supervisor for ResumingSupervisor {
    fn decide(&self, _fault: &ActorFault) -> SupervisionDirective {
        SupervisionDirective::Resume
    }
}

#[derive(Default)]
struct StoppingSupervisor {
    scope: SupervisionScope,
}

#[async_trait]
impl Actor for StoppingSupervisor {}

#[async_trait]
impl Supervisor for StoppingSupervisor {
    fn strategy(&self) -> SupervisionStrategy {
        SupervisionStrategy::new(5, Duration::from_secs(5), self.scope)
    }

    fn decide(&self, _fault: &ActorFault) -> SupervisionDirective {
        SupervisionDirective::Stop
    }
}

#[derive(Default)]
struct TouchySupervisor;

#[async_trait]
impl Actor for TouchySupervisor {}

#[async_trait]
impl Supervisor for TouchySupervisor {
    fn strategy(&self) -> SupervisionStrategy {
        SupervisionStrategy::new(1, Duration::from_secs(60), SupervisionScope::One)
    }
}

#[tokio::test]
async fn restart_directive_replaces_the_instance() {
    let stage = Stage::new(StageConfig::default());
    stage
        .register_supervisor(
            "restarting",
            Definition::of("RestartingSupervisor", RestartingSupervisor::default),
        )
        .unwrap();

    let events = ObservableState::new(Vec::new());
    let counter = stage
        .actor_for(counter_definition(&events, "restarting"))
        .unwrap();

    counter.increment();
    counter.increment();
    counter.increment();
    assert_eq!(counter.get_value().await.unwrap(), 3);

    let fault = counter.cause_error().await.unwrap_err();
    assert!(matches!(fault, ActorFault::Handler { selector, .. } if selector == "cause_error"));

    // Fresh instance: the queued read resolves against value zero.
    assert_eq!(counter.get_value().await.unwrap(), 0);
    counter.increment();
    assert_eq!(counter.get_value().await.unwrap(), 1);

    let log = events.get();
    let before = log.iter().position(|entry| entry == "before_restart");
    let after = log.iter().position(|entry| entry == "after_restart");
    assert!(before.unwrap() < after.unwrap());

    stage.close().await;
}

#[tokio::test]
async fn resume_directive_preserves_state() {
    let stage = Stage::new(StageConfig::default());
    stage
        .register_supervisor(
            "resuming",
            Definition::of("ResumingSupervisor", ResumingSupervisor::default),
        )
        .unwrap();

    let events = ObservableState::new(Vec::new());
    let counter = stage
        .actor_for(counter_definition(&events, "resuming"))
        .unwrap();

    counter.increment();
    counter.increment();
    counter.increment();
    assert_eq!(counter.get_value().await.unwrap(), 3);

    counter.cause_error().await.unwrap_err();
    assert_eq!(counter.get_value().await.unwrap(), 3);

    assert!(events.get().contains(&"before_resume".to_string()));

    stage.close().await;
}

#[tokio::test]
async fn stop_directive_stops_the_actor_and_dead_letters_later_sends() {
    let stage = Stage::new(StageConfig::default());
    let letters = CapturingDeadLetters::arc();
    stage
        .dead_letters()
        .register_listener(Arc::clone(&letters) as Arc<dyn DeadLettersListener>);
    stage
        .register_supervisor(
            "stopping",
            Definition::of("StoppingSupervisor", StoppingSupervisor::default),
        )
        .unwrap();

    let events = ObservableState::new(Vec::new());
    let counter = stage
        .actor_for(counter_definition(&events, "stopping"))
        .unwrap();

    counter.cause_error().await.unwrap_err();
    assert!(testkit::await_stopped(&counter, Duration::from_secs(2)).await);

    let rejected = counter.get_value().await.unwrap_err();
    assert_eq!(rejected, ActorFault::Stopped);
    assert!(!letters.containing("get_value").is_empty());

    stage.close().await;
}

#[tokio::test]
async fn exhausted_intensity_window_escalates_to_the_public_root() {
    let logger = CapturingLogger::arc();
    let stage = Stage::with_logger(
        StageConfig::default(),
        Arc::clone(&logger) as Arc<dyn Logger>,
    );
    stage
        .register_supervisor(
            "touchy",
            Definition::of("TouchySupervisor", TouchySupervisor::default),
        )
        .unwrap();

    let events = ObservableState::new(Vec::new());
    let counter = stage
        .actor_for(counter_definition(&events, "touchy"))
        .unwrap();

    // First fault restarts within the window.
    counter.cause_error().await.unwrap_err();
    assert_eq!(counter.get_value().await.unwrap(), 0);

    // Second fault exhausts intensity 1 and escalates; the public root
    // restarts forever, so the actor comes back again.
    counter.cause_error().await.unwrap_err();
    assert_eq!(counter.get_value().await.unwrap(), 0);

    assert!(
        testkit::eventually(Duration::from_secs(2), || logger
            .contains("info", "Escalate"))
        .await
    );

    let restarts = events
        .get()
        .iter()
        .filter(|entry| entry.as_str() == "after_restart")
        .count();
    assert_eq!(restarts, 2);

    stage.close().await;
}

#[tokio::test]
async fn stop_with_scope_all_stops_the_siblings_too() {
    let stage = Stage::new(StageConfig::default());
    stage
        .register_supervisor(
            "stop-all",
            Definition::of("StoppingSupervisor", || StoppingSupervisor {
                scope: SupervisionScope::All,
            }),
        )
        .unwrap();

    let events = ObservableState::new(Vec::new());
    let first = stage
        .actor_for(counter_definition(&events, "stop-all"))
        .unwrap();
    let second = stage
        .actor_for(counter_definition(&events, "stop-all"))
        .unwrap();

    // Both siblings must be enrolled (Running) before the fault.
    assert_eq!(first.get_value().await.unwrap(), 0);
    assert_eq!(second.get_value().await.unwrap(), 0);

    first.cause_error().await.unwrap_err();

    assert!(testkit::await_stopped(&first, Duration::from_secs(2)).await);
    assert!(testkit::await_stopped(&second, Duration::from_secs(2)).await);

    stage.close().await;
}

#[tokio::test]
async fn supervisor_sees_the_execution_context_of_the_failing_message() {
    struct InspectingSupervisor {
        seen: ObservableState<Vec<String>>,
    }

    #[async_trait]
    impl Actor for InspectingSupervisor {}

    #[async_trait]
    impl Supervisor for InspectingSupervisor {
        async fn inform(
            &mut self,
            supervised: Supervised,
            _context: &mut ActorContext<Self>,
        ) -> ActorResult<()> {
            if let Some(command) = supervised.execution_context().get("command") {
                self.seen.update(|seen| seen.push(command.clone()));
            }
            supervised.apply(SupervisionDirective::Resume, SupervisionScope::One);
            Ok(())
        }
    }

    let stage = Stage::new(StageConfig::default());
    let seen = ObservableState::new(Vec::new());
    let seen_clone = seen.clone();
    stage
        .register_supervisor(
            "inspecting",
            Definition::of("InspectingSupervisor", move || InspectingSupervisor {
                seen: seen_clone.clone(),
            }),
        )
        .unwrap();

    let events = ObservableState::new(Vec::new());
    let counter = stage
        .actor_for(counter_definition(&events, "inspecting"))
        .unwrap();

    counter.cause_error().await.unwrap_err();
    let captured = seen
        .await_that(Duration::from_secs(2), |seen| !seen.is_empty())
        .await
        .unwrap();
    assert_eq!(captured, vec!["cause_error".to_string()]);

    stage.close().await;
}
