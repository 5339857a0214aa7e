// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record builders with fixed, readable defaults.
//!
//! Timestamps are offsets in seconds from 2026-01-01T00:00:00Z so tests can
//! reason about ordering without clocks.

use std::io::Write;

use chrono::{DateTime, Utc};
use flate2::write::GzEncoder;

use vigil_core::{
    CallStatus, Compression, Message, ModelCallTrace, Payload, PayloadRef, PayloadStorage, Role,
    ToolCallTrace,
};

const BASE_UNIX_SECS: i64 = 1_767_225_600;

/// `BASE + secs`.
pub fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(BASE_UNIX_SECS + secs, 0).unwrap_or_default()
}

/// A final (non-interim) text message created `sequence` seconds after base.
pub fn message(id: &str, conversation_id: &str, turn_id: &str, sequence: i64, role: Role) -> Message {
    Message {
        id: id.to_string(),
        conversation_id: conversation_id.to_string(),
        turn_id: Some(turn_id.to_string()),
        sequence: Some(sequence),
        created_at: at(sequence),
        role,
        kind: "text".to_string(),
        content: Some(format!("{role} says {id}")),
        interim: false,
        tool_name: None,
        elicitation_id: None,
        status: None,
        model_call: None,
        tool_call: None,
    }
}

/// A model call; terminal statuses get a completion timestamp.
pub fn model_call(message_id: &str, status: CallStatus) -> ModelCallTrace {
    ModelCallTrace {
        message_id: message_id.to_string(),
        turn_id: None,
        provider: "anthropic".to_string(),
        model: "claude-sonnet".to_string(),
        kind: Some("chat".to_string()),
        status,
        prompt_tokens: 120,
        completion_tokens: 30,
        total_tokens: 150,
        finish_reason: (status == CallStatus::Completed).then(|| "stop".to_string()),
        cost: Some(0.0021),
        started_at: Some(at(0)),
        completed_at: (status != CallStatus::Running).then(|| at(1)),
        latency_ms: (status != CallStatus::Running).then_some(1000),
        request_payload_id: None,
        response_payload_id: None,
    }
}

/// One attempt of a tool call.
pub fn tool_call(message_id: &str, op_id: &str, attempt: u32, status: CallStatus) -> ToolCallTrace {
    ToolCallTrace {
        message_id: message_id.to_string(),
        turn_id: None,
        op_id: op_id.to_string(),
        attempt,
        tool_name: "shell".to_string(),
        tool_kind: Some("builtin".to_string()),
        status,
        error_code: (status == CallStatus::Failed).then(|| "exit_1".to_string()),
        error_message: (status == CallStatus::Failed).then(|| "command failed".to_string()),
        cost: None,
        started_at: Some(at(0)),
        completed_at: (status != CallStatus::Running).then(|| at(2)),
        request: None,
        response: None,
    }
}

/// Point a tool call at a payload through a legacy JSON snapshot.
pub fn snapshot_ref(payload_id: &str) -> PayloadRef {
    PayloadRef::Snapshot(serde_json::json!({ "payloadId": payload_id, "truncated": true }))
}

/// An uncompressed inline payload.
pub fn inline_payload(id: &str, body: &[u8]) -> Payload {
    Payload {
        id: id.to_string(),
        kind: "tool_response".to_string(),
        mime_type: Some("text/plain".to_string()),
        size_bytes: body.len() as u64,
        storage: PayloadStorage::Inline {
            body: body.to_vec(),
        },
        compression: Compression::None,
        redacted: false,
        preview: Some(String::from_utf8_lossy(&body[..body.len().min(16)]).into_owned()),
    }
}

/// An inline payload stored gzip-compressed.
pub fn gzip_payload(id: &str, body: &[u8]) -> Payload {
    Payload {
        storage: PayloadStorage::Inline { body: gzip(body) },
        compression: Compression::Gzip,
        ..inline_payload(id, body)
    }
}

/// An object-stored payload.
pub fn object_payload(id: &str, uri: &str, size_bytes: u64) -> Payload {
    Payload {
        id: id.to_string(),
        kind: "model_response".to_string(),
        mime_type: Some("application/octet-stream".to_string()),
        size_bytes,
        storage: PayloadStorage::Object {
            uri: uri.to_string(),
        },
        compression: Compression::None,
        redacted: false,
        preview: None,
    }
}

/// Gzip-compress bytes.
pub fn gzip(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
    // Writes into a Vec cannot fail.
    let _ = encoder.write_all(bytes);
    encoder.finish().unwrap_or_default()
}
