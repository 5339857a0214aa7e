// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-Sent Events for GET /v1/conversations/{id}/events.
//!
//! The stream opens with the conversation's current stage, then relays every
//! event published for the conversation. Event names match
//! [`vigil_core::EventPayload::name`]:
//!
//! ```text
//! event: stage
//! data: {"conversationId":"c1","emittedAt":"...","payload":{"type":"stage","data":"thinking"}}
//! ```
//!
//! A client disconnect drops the stream, which cancels the subscription.

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream, StreamExt};

use vigil_core::{EventPayload, ExecutionEvent};

use crate::server::GatewayState;

/// Stream live execution events for one conversation.
pub async fn stream_events(
    State(state): State<GatewayState>,
    Path(conversation_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Subscribe before reading the stage so nothing published in between is lost.
    let (subscription, _cancel) = state.bus.subscribe(conversation_id.clone());
    tracing::debug!(
        conversation_id = %conversation_id,
        subscribers = state.bus.subscriber_count(&conversation_id),
        "event stream opened"
    );

    let stage = state.stage.infer(&conversation_id).await;
    let initial = ExecutionEvent::new(conversation_id, EventPayload::Stage(stage));

    let events = stream::once(async move { initial })
        .chain(subscription)
        .map(|event| Ok(to_sse(&event)));
    Sse::new(events).keep_alive(KeepAlive::default())
}

fn to_sse(event: &ExecutionEvent) -> Event {
    match Event::default().event(event.payload.name()).json_data(event) {
        Ok(sse) => sse,
        Err(e) => {
            tracing::error!(error = %e, "failed to encode execution event");
            Event::default()
                .event("error")
                .data(r#"{"error": "event encoding failed"}"#)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::Stage;

    #[test]
    fn event_name_follows_payload() {
        let event = ExecutionEvent::new("c1", EventPayload::Stage(Stage::Done));
        let rendered = format!("{:?}", to_sse(&event));
        assert!(rendered.contains("stage"));
    }
}
