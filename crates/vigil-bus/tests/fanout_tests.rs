// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multi-subscriber delivery across tasks.

use std::time::Duration;

use futures::StreamExt;
use vigil_bus::EventBus;
use vigil_core::{CallStatus, EventPayload, ExecutionEvent, Role, Stage};
use vigil_test_utils::fixtures::{message, tool_call};

fn event(conversation_id: &str, payload: EventPayload) -> ExecutionEvent {
    ExecutionEvent::new(conversation_id, payload).with_turn("t1")
}

#[tokio::test]
async fn every_subscriber_of_a_conversation_receives_in_order() {
    let bus = EventBus::default();
    let (mut first, _c1) = bus.subscribe("c1");
    let (mut second, _c2) = bus.subscribe("c1");
    let (mut other, _c3) = bus.subscribe("c2");

    bus.publish(event("c1", EventPayload::Message(message("m1", "c1", "t1", 1, Role::User))));
    bus.publish(event(
        "c1",
        EventPayload::ToolCall(tool_call("m2", "op-1", 1, CallStatus::Running)),
    ));
    bus.publish(event("c1", EventPayload::Stage(Stage::Executing)));

    for subscription in [&mut first, &mut second] {
        let names: Vec<&str> = [
            subscription.recv().await.unwrap(),
            subscription.recv().await.unwrap(),
            subscription.recv().await.unwrap(),
        ]
        .iter()
        .map(|e| e.payload.name())
        .collect();
        assert_eq!(names, vec!["message", "tool_call", "stage"]);
    }

    assert!(other.try_recv().is_none());
}

#[tokio::test]
async fn producer_on_another_task_never_blocks_on_a_stalled_viewer() {
    let bus = EventBus::new(2);
    let (_stalled, _cancel) = bus.subscribe("c1");

    let producer = {
        let bus = bus.clone();
        tokio::spawn(async move {
            for _ in 0..100 {
                bus.publish(event("c1", EventPayload::Stage(Stage::Thinking)));
            }
        })
    };
    tokio::time::timeout(Duration::from_secs(1), producer)
        .await
        .expect("publisher blocked")
        .unwrap();
}

#[tokio::test]
async fn cancelled_stream_ends_and_second_cancel_is_noop() {
    let bus = EventBus::default();
    let (mut subscription, cancel) = bus.subscribe("c1");

    bus.publish(event("c1", EventPayload::Stage(Stage::Thinking)));
    assert!(subscription.next().await.is_some());

    cancel.cancel();
    bus.publish(event("c1", EventPayload::Stage(Stage::Done)));
    assert!(subscription.next().await.is_none());

    cancel.cancel();
    assert_eq!(bus.subscriber_count("c1"), 0);
}

#[tokio::test]
async fn resubscribe_after_cancel_gets_fresh_queue() {
    let bus = EventBus::default();
    let (_old, cancel) = bus.subscribe("c1");
    cancel.cancel();

    let (mut fresh, _fresh_cancel) = bus.subscribe("c1");
    assert_eq!(bus.publish(event("c1", EventPayload::Stage(Stage::Done))), 1);
    assert_eq!(
        fresh.recv().await.map(|e| e.payload),
        Some(EventPayload::Stage(Stage::Done))
    );
}
