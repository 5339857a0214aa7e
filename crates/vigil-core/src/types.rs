// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record types written by the execution pipeline and read back by Vigil.
//!
//! Records are immutable from Vigil's point of view: the aggregator, stage
//! inference, and payload delivery only ever observe them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Who produced a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
    Control,
}

/// Lifecycle status of a model or tool call.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CallStatus {
    Running,
    Completed,
    Failed,
}

/// One turn-scoped unit of dialogue or system event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub role: Role,
    /// Free-form message type (`text`, `elicitation`, `summary`, ...).
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub interim: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elicitation_id: Option<String>,
    /// Message-level status; for elicitations this tracks the user's answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Model call embedded in the row by repositories that join it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_call: Option<ModelCallTrace>,
    /// Tool call embedded in the row by repositories that join it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<ToolCallTrace>,
}

impl Message {
    /// True when this message asks the user for input that has not been answered yet.
    pub fn has_pending_elicitation(&self) -> bool {
        if self.elicitation_id.is_none() {
            return false;
        }
        match self.status.as_deref() {
            None => true,
            Some(status) => matches!(status, "" | "pending" | "open"),
        }
    }
}

/// One LLM invocation attached to a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelCallTrace {
    pub message_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_id: Option<String>,
    pub provider: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub status: CallStatus,
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_payload_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_payload_id: Option<String>,
}

impl ModelCallTrace {
    /// A call is in flight until it reports completion, unless it already failed.
    pub fn is_running(&self) -> bool {
        match self.status {
            CallStatus::Running => true,
            CallStatus::Failed => false,
            CallStatus::Completed => self.completed_at.is_none(),
        }
    }
}

/// Where a tool call's request or response body lives.
///
/// Older writers did not record a payload id column and instead stored a JSON
/// snapshot with an embedded `payloadId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadRef {
    Id(String),
    Snapshot(serde_json::Value),
}

impl PayloadRef {
    /// Resolve the referenced payload id, if any.
    pub fn payload_id(&self) -> Option<&str> {
        match self {
            Self::Id(id) if !id.is_empty() => Some(id),
            Self::Id(_) => None,
            Self::Snapshot(value) => value
                .get("payloadId")
                .or_else(|| value.get("payload_id"))
                .and_then(|v| v.as_str())
                .filter(|id| !id.is_empty()),
        }
    }
}

/// One tool invocation attempt attached to a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallTrace {
    pub message_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_id: Option<String>,
    /// Logical operation id shared by every retry of the same invocation.
    pub op_id: String,
    /// Retry ordinal; the highest attempt per `op_id` is authoritative.
    #[serde(default)]
    pub attempt: u32,
    pub tool_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_kind: Option<String>,
    pub status: CallStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<PayloadRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<PayloadRef>,
}

impl ToolCallTrace {
    /// Running, or no completion timestamp yet whatever the status says.
    pub fn is_running(&self) -> bool {
        self.status == CallStatus::Running || self.completed_at.is_none()
    }

    pub fn is_failed(&self) -> bool {
        self.status == CallStatus::Failed
    }
}

/// Compression applied to a stored payload body.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Compression {
    #[default]
    None,
    Gzip,
}

/// Where a payload body is kept. Fixed when the payload is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum PayloadStorage {
    /// Body stored directly in the record.
    Inline {
        #[serde(with = "crate::serde_base64")]
        body: Vec<u8>,
    },
    /// Body stored in an external object store.
    Object { uri: String },
    /// Storage mode this build does not understand.
    Unsupported { name: String },
}

impl PayloadStorage {
    pub fn mode(&self) -> &str {
        match self {
            Self::Inline { .. } => "inline",
            Self::Object { .. } => "object",
            Self::Unsupported { name } => name,
        }
    }
}

/// A stored blob of prompt, response, or tool I/O content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    pub id: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size_bytes: u64,
    pub storage: PayloadStorage,
    #[serde(default)]
    pub compression: Compression,
    #[serde(default)]
    pub redacted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

/// Inferred live phase of a conversation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Stage {
    #[default]
    Waiting,
    Thinking,
    Executing,
    Eliciting,
    Error,
    Done,
}
