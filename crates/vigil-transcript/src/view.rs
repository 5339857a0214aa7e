// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Output types. Built per request and never persisted.

use serde::Serialize;

use vigil_core::{Compression, Message, ModelCallTrace, ToolCallTrace};

/// A payload as it appears in a transcript, shaped by the payload level.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadView {
    pub id: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub size_bytes: u64,
    /// `inline`, `object`, or whatever unrecognized mode the record carries.
    pub storage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    pub compression: Compression,
    pub redacted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "vigil_core::serde_base64::option::serialize"
    )]
    pub inline_body: Option<Vec<u8>>,
}

/// A model call with its shaped request/response payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelCallView {
    #[serde(flatten)]
    pub trace: ModelCallTrace,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_payload: Option<PayloadView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_payload: Option<PayloadView>,
}

/// The authoritative attempt of a tool call with its shaped payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallView {
    #[serde(flatten)]
    pub trace: ToolCallTrace,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_payload: Option<PayloadView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_payload: Option<PayloadView>,
}

/// One message plus whichever traces were requested.
///
/// Embedded traces are moved out of `message` into the view fields, so each
/// trace appears once in the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedMessage {
    #[serde(flatten)]
    pub message: Message,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_call: Option<ModelCallView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<ToolCallView>,
}

/// Ordered, policy-shaped conversation history.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedTranscript {
    pub conversation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_id: Option<String>,
    pub messages: Vec<AggregatedMessage>,
}

impl AggregatedTranscript {
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.messages.iter().map(|m| m.message.id.as_str()).collect()
    }

    /// Plain message rows, without the attached traces.
    pub fn into_rows(self) -> Vec<Message> {
        self.messages.into_iter().map(|m| m.message).collect()
    }
}
