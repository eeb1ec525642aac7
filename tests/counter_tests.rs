//! FIFO dispatch and proxy-surface behavior for a plain counter actor.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use async_trait::async_trait;
use stagehand::prelude::*;
use stagehand::testkit::{self, ObservableState};

struct Counter {
    value: i64,
    events: ObservableState<Vec<String>>,
}

#[async_trait]
impl Actor for Counter {
    async fn before_start(&mut self, _context: &mut ActorContext<Self>) -> ActorResult<()> {
        self.events.update(|log| log.push("before_start".to_string()));
        Ok(())
    }
}

trait CounterProtocol {
    fn increment(&self) -> Completes<()>;
    fn get_value(&self) -> Completes<i64>;
    fn slow_mark(&self, label: &'static str) -> Completes<()>;
    fn increment_self_then_mark(&self) -> Completes<()>;
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

    fn slow_mark(&self, label: &'static str) -> Completes<()> {
        self.send("slow_mark", move |actor, _| {
            Box::pin(async move {
                actor
                    .events
                    .update(|log| log.push(format!("{label}-begin")));
                tokio::time::sleep(Duration::from_millis(20)).await;
                actor.events.update(|log| log.push(format!("{label}-end")));
                Ok(())
            })
        })
    }

    fn increment_self_then_mark(&self) -> Completes<()> {
        self.send_sync("increment_self_then_mark", |actor, context| {
            context.self_proxy().increment();
            actor
                .events
                .update(|log| log.push("outer-end".to_string()));
            Ok(())
        })
    }
}

fn counter_definition(events: &ObservableState<Vec<String>>) -> Definition<Counter> {
    let events = events.clone();
    Definition::of("Counter", move || Counter {
        value: 0,
        events: events.clone(),
    })
}

#[tokio::test]
async fn counter_processes_messages_in_fifo_order() {
    let stage = Stage::new(StageConfig::default());
    let events = ObservableState::new(Vec::new());
    let counter = stage.actor_for(counter_definition(&events)).unwrap();

    counter.increment();
    counter.increment();
    counter.increment();
    let value = counter.get_value().await.unwrap();
    assert_eq!(value, 3);

    stage.close().await;
}

#[tokio::test]
async fn handlers_never_interleave_within_one_actor() {
    let stage = Stage::new(StageConfig::default());
    let events = ObservableState::new(Vec::new());
    let counter = stage.actor_for(counter_definition(&events)).unwrap();

    counter.slow_mark("first");
    counter.slow_mark("second");
    let log = events
        .await_that(Duration::from_secs(2), |log| log.len() >= 5)
        .await
        .unwrap();

    let order: Vec<&str> = log.iter().map(String::as_str).collect();
    assert_eq!(
        order,
        vec![
            "before_start",
            "first-begin",
            "first-end",
            "second-begin",
            "second-end"
        ]
    );

    stage.close().await;
}

#[tokio::test]
async fn self_sent_messages_run_after_the_in_flight_handler() {
    let stage = Stage::new(StageConfig::default());
    let events = ObservableState::new(Vec::new());
    let counter = stage.actor_for(counter_definition(&events)).unwrap();

    counter.increment_self_then_mark().await.unwrap();
    // The self-sent increment was queued behind the in-flight handler and
    // ahead of this read.
    let value = counter.get_value().await.unwrap();
    assert_eq!(value, 1);

    let log = events.get();
    assert!(log.contains(&"outer-end".to_string()));

    stage.close().await;
}

#[tokio::test]
async fn starting_a_running_actor_is_a_noop() {
    let stage = Stage::new(StageConfig::default());
    let events = ObservableState::new(Vec::new());
    let counter = stage.actor_for(counter_definition(&events)).unwrap();

    let _ = counter.get_value().await.unwrap();
    counter.start();
    counter.start();
    let _ = counter.get_value().await.unwrap();

    let starts = events
        .get()
        .iter()
        .filter(|entry| entry.as_str() == "before_start")
        .count();
    assert_eq!(starts, 1);

    stage.close().await;
}

#[tokio::test]
async fn repeated_lookups_return_the_identical_proxy() {
    let stage = Stage::new(StageConfig::default());
    let events = ObservableState::new(Vec::new());
    let counter = stage.actor_for(counter_definition(&events)).unwrap();
    let address = *counter.address();

    assert!(
        testkit::eventually(Duration::from_secs(1), || {
            stage.actor_of::<Counter>(&address).is_some()
        })
        .await
    );

    let first = stage.actor_of::<Counter>(&address).unwrap();
    let second = stage.actor_of::<Counter>(&address).unwrap();
    assert!(first.ptr_eq(&second));
    assert_eq!(first, second);

    stage.close().await;
}

#[tokio::test]
async fn operational_methods_answer_without_the_mailbox() {
    let stage = Stage::new(StageConfig::default());
    let events = ObservableState::new(Vec::new());
    let counter = stage.actor_for(counter_definition(&events)).unwrap();

    testkit::suspend_dispatch(&counter);
    assert_eq!(counter.protocol(), "Counter");
    assert_eq!(counter.definition().protocol(), "Counter");
    assert_eq!(counter.definition().address(), Some(counter.address()));
    assert!(counter.definition().parameters().is_empty());
    assert!(!counter.is_stopped());
    assert_eq!(counter.to_string(), format!("Counter@{}", counter.address()));
    counter.logger().debug("operational surface reachable");
    testkit::resume_dispatch(&counter);

    stage.close().await;
}
