// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live execution events pushed to viewers of a conversation.
//!
//! These carry the same records the aggregator later rebuilds from storage,
//! but they are never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Message, ModelCallTrace, Stage, ToolCallTrace};

/// What happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EventPayload {
    Message(Message),
    ModelCall(ModelCallTrace),
    ToolCall(ToolCallTrace),
    Stage(Stage),
}

impl EventPayload {
    /// Short event name, used as the SSE `event:` field.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::ModelCall(_) => "model_call",
            Self::ToolCall(_) => "tool_call",
            Self::Stage(_) => "stage",
        }
    }
}

/// One live event scoped to a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionEvent {
    pub conversation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_id: Option<String>,
    pub emitted_at: DateTime<Utc>,
    pub payload: EventPayload,
}

impl ExecutionEvent {
    pub fn new(conversation_id: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            turn_id: None,
            emitted_at: Utc::now(),
            payload,
        }
    }

    pub fn with_turn(mut self, turn_id: impl Into<String>) -> Self {
        self.turn_id = Some(turn_id.into());
        self
    }
}
