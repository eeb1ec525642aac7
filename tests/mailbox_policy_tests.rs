//! Bounded-mailbox overflow behavior observed through live actors.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use stagehand::prelude::*;
use stagehand::testkit::{self, CapturingDeadLetters, ObservableState};

struct Recorder {
    seen: ObservableState<Vec<i32>>,
}

#[async_trait]
impl Actor for Recorder {}

trait RecorderProtocol {
    fn record(&self, value: i32) -> Completes<()>;
}

impl RecorderProtocol for Proxy<Recorder> {
    fn record(&self, value: i32) -> Completes<()> {
        self.send_sync("record", move |actor, _| {
            actor.seen.update(|seen| seen.push(value));
            Ok(())
        })
    }
}

fn recorder_definition(
    seen: &ObservableState<Vec<i32>>,
    mailbox: MailboxConfig,
) -> Definition<Recorder> {
    let seen = seen.clone();
    Definition::of("Recorder", move || Recorder { seen: seen.clone() }).with_mailbox(mailbox)
}

async fn settle(stage: &Stage, recorder: &Proxy<Recorder>) {
    // One processed message proves the actor reached Running.
    let _ = stage;
    recorder.record(0).await.unwrap();
}

#[tokio::test]
async fn drop_oldest_keeps_the_last_messages() {
    let stage = Stage::new(StageConfig::default());
    let seen = ObservableState::new(Vec::new());
    let recorder = stage
        .actor_for(recorder_definition(
            &seen,
            MailboxConfig::bounded(3, OverflowPolicy::DropOldest),
        ))
        .unwrap();
    settle(&stage, &recorder).await;

    testkit::suspend_dispatch(&recorder);
    for value in 1..=5 {
        recorder.record(value);
    }
    assert_eq!(testkit::queued_count(&recorder), 3);
    testkit::resume_dispatch(&recorder);

    let processed = seen
        .await_that(Duration::from_secs(2), |seen| seen.len() >= 4)
        .await
        .unwrap();
    assert_eq!(processed, vec![0, 3, 4, 5]);
    assert_eq!(testkit::dropped_count(&recorder), 2);

    stage.close().await;
}

#[tokio::test]
async fn drop_newest_keeps_the_first_messages() {
    let stage = Stage::new(StageConfig::default());
    let seen = ObservableState::new(Vec::new());
    let recorder = stage
        .actor_for(recorder_definition(
            &seen,
            MailboxConfig::bounded(3, OverflowPolicy::DropNewest),
        ))
        .unwrap();
    settle(&stage, &recorder).await;

    testkit::suspend_dispatch(&recorder);
    for value in 1..=5 {
        recorder.record(value);
    }
    testkit::resume_dispatch(&recorder);

    let processed = seen
        .await_that(Duration::from_secs(2), |seen| seen.len() >= 4)
        .await
        .unwrap();
    assert_eq!(processed, vec![0, 1, 2, 3]);
    assert_eq!(testkit::dropped_count(&recorder), 2);

    stage.close().await;
}

#[tokio::test]
async fn reject_routes_overflow_to_dead_letters() {
    let stage = Stage::new(StageConfig::default());
    let letters = CapturingDeadLetters::arc();
    stage
        .dead_letters()
        .register_listener(Arc::clone(&letters) as Arc<dyn DeadLettersListener>);

    let seen = ObservableState::new(Vec::new());
    let recorder = stage
        .actor_for(recorder_definition(
            &seen,
            MailboxConfig::bounded(3, OverflowPolicy::Reject),
        ))
        .unwrap();
    settle(&stage, &recorder).await;

    testkit::suspend_dispatch(&recorder);
    let outcomes: Vec<Completes<()>> = (1..=5).map(|value| recorder.record(value)).collect();
    testkit::resume_dispatch(&recorder);

    let mut faults = Vec::new();
    for outcome in outcomes {
        if let Err(fault) = outcome.await {
            faults.push(fault);
        }
    }
    assert_eq!(faults, vec![ActorFault::MailboxOverflow, ActorFault::MailboxOverflow]);

    let processed = seen
        .await_that(Duration::from_secs(2), |seen| seen.len() >= 4)
        .await
        .unwrap();
    assert_eq!(processed, vec![0, 1, 2, 3]);
    assert_eq!(testkit::dropped_count(&recorder), 2);

    let overflow = letters.with_reason("mailbox overflow");
    assert_eq!(overflow.len(), 2);
    assert!(overflow
        .iter()
        .all(|letter| letter.representation == "Recorder::record"));
    assert!(overflow
        .iter()
        .all(|letter| letter.address == *recorder.address()));

    stage.close().await;
}

#[tokio::test]
async fn suspended_mailboxes_dispatch_nothing_until_resumed() {
    let stage = Stage::new(StageConfig::default());
    let seen = ObservableState::new(Vec::new());
    let recorder = stage
        .actor_for(recorder_definition(&seen, MailboxConfig::unbounded()))
        .unwrap();
    settle(&stage, &recorder).await;

    testkit::suspend_dispatch(&recorder);
    for value in 1..=3 {
        recorder.record(value);
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(seen.get(), vec![0]);

    testkit::resume_dispatch(&recorder);
    let processed = seen
        .await_that(Duration::from_secs(2), |seen| seen.len() == 4)
        .await
        .unwrap();
    assert_eq!(processed, vec![0, 1, 2, 3]);

    stage.close().await;
}
