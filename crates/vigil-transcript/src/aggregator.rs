// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Joins message, model-call, tool-call, and payload records into one
//! ordered transcript.
//!
//! Aggregation is all-or-nothing: any repository failure, or a trace that
//! references a payload the store does not have, fails the whole request.
//! A partial transcript would misrepresent what the agent did.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use vigil_core::{
    Message, MessageFilter, MessageRepository, ModelCallRepository, ModelCallTrace,
    PayloadRepository, ToolCallRepository, ToolCallTrace, TraceFilter, VigilError,
};
use vigil_security::RedactionPolicy;

use crate::options::{PayloadLevel, TranscriptOptions};
use crate::shape::shape_payload;
use crate::view::{
    AggregatedMessage, AggregatedTranscript, ModelCallView, PayloadView, ToolCallView,
};

/// A message with its unresolved traces, before payload shaping.
struct Entry {
    message: Message,
    model_call: Option<ModelCallTrace>,
    tool_call: Option<ToolCallTrace>,
}

/// Builds [`AggregatedTranscript`]s from the repositories.
///
/// Stateless per call; safe to share behind an `Arc` across requests.
pub struct TranscriptAggregator {
    messages: Arc<dyn MessageRepository>,
    model_calls: Arc<dyn ModelCallRepository>,
    tool_calls: Arc<dyn ToolCallRepository>,
    payloads: Arc<dyn PayloadRepository>,
    redaction: RedactionPolicy,
}

impl TranscriptAggregator {
    pub fn new(
        messages: Arc<dyn MessageRepository>,
        model_calls: Arc<dyn ModelCallRepository>,
        tool_calls: Arc<dyn ToolCallRepository>,
        payloads: Arc<dyn PayloadRepository>,
    ) -> Self {
        Self {
            messages,
            model_calls,
            tool_calls,
            payloads,
            redaction: RedactionPolicy::default(),
        }
    }

    /// Use this key list when `redact_sensitive` is requested.
    pub fn with_redaction(mut self, policy: RedactionPolicy) -> Self {
        self.redaction = policy;
        self
    }

    /// Aggregate one conversation, optionally narrowed to a turn.
    pub async fn aggregate(
        &self,
        conversation_id: &str,
        turn_id: Option<&str>,
        options: &TranscriptOptions,
    ) -> Result<AggregatedTranscript, VigilError> {
        let filter = MessageFilter {
            conversation_id: Some(conversation_id.to_string()),
            turn_id: turn_id.map(str::to_string),
            exclude_interim: options.exclude_interim,
            include_tools: options.include_tools,
            since: options.since,
        };

        let mut rows = self
            .messages
            .transcript(conversation_id, turn_id, &filter)
            .await?;
        let fetched = rows.len();
        // Backends may ignore filters they cannot express.
        rows.retain(|m| filter.matches(m));
        sort_rows(&mut rows);

        // Traces are attached across the whole scope before windowing so the
        // attempt dedup sees every op id, not just the returned page.
        let mut entries = Vec::with_capacity(rows.len());
        for mut message in rows {
            let embedded_model = message.model_call.take();
            let embedded_tool = message.tool_call.take();

            let model_call = match (options.include_model_calls, embedded_model) {
                (false, _) => None,
                (true, Some(trace)) => Some(trace),
                (true, None) => self.fetch_model_call(&message.id).await?,
            };
            let tool_call = match (options.include_tool_calls, embedded_tool) {
                (false, _) => None,
                (true, Some(trace)) => Some(trace),
                (true, None) => self.fetch_tool_call(&message.id).await?,
            };

            entries.push(Entry {
                message,
                model_call,
                tool_call,
            });
        }

        keep_latest_attempts(&mut entries);
        let entries = window(
            entries,
            options.since_id.as_deref(),
            options.limit,
            |e| e.message.id.as_str(),
        );

        let mut messages = Vec::with_capacity(entries.len());
        for entry in entries {
            let model_call = match entry.model_call {
                Some(trace) => Some(self.model_call_view(trace, options).await?),
                None => None,
            };
            let tool_call = match entry.tool_call {
                Some(trace) => Some(self.tool_call_view(trace, options).await?),
                None => None,
            };
            messages.push(AggregatedMessage {
                message: entry.message,
                model_call,
                tool_call,
            });
        }

        debug!(
            conversation_id,
            turn_id = ?turn_id,
            fetched,
            returned = messages.len(),
            "aggregated transcript"
        );

        Ok(AggregatedTranscript {
            conversation_id: conversation_id.to_string(),
            turn_id: turn_id.map(str::to_string),
            messages,
        })
    }

    async fn fetch_model_call(
        &self,
        message_id: &str,
    ) -> Result<Option<ModelCallTrace>, VigilError> {
        let mut traces = self
            .model_calls
            .list(&TraceFilter::for_message(message_id))
            .await?;
        Ok(traces.pop())
    }

    async fn fetch_tool_call(
        &self,
        message_id: &str,
    ) -> Result<Option<ToolCallTrace>, VigilError> {
        let traces = self
            .tool_calls
            .list(&TraceFilter::for_message(message_id))
            .await?;
        Ok(traces
            .into_iter()
            .reduce(|best, t| if t.attempt >= best.attempt { t } else { best }))
    }

    async fn model_call_view(
        &self,
        trace: ModelCallTrace,
        options: &TranscriptOptions,
    ) -> Result<ModelCallView, VigilError> {
        let request_payload = self
            .payload_view(trace.request_payload_id.as_deref(), options)
            .await?;
        let response_payload = self
            .payload_view(trace.response_payload_id.as_deref(), options)
            .await?;
        Ok(ModelCallView {
            trace,
            request_payload,
            response_payload,
        })
    }

    async fn tool_call_view(
        &self,
        trace: ToolCallTrace,
        options: &TranscriptOptions,
    ) -> Result<ToolCallView, VigilError> {
        let request_id = trace.request.as_ref().and_then(|r| r.payload_id());
        let response_id = trace.response.as_ref().and_then(|r| r.payload_id());
        let request_payload = self.payload_view(request_id, options).await?;
        let response_payload = self.payload_view(response_id, options).await?;
        Ok(ToolCallView {
            trace,
            request_payload,
            response_payload,
        })
    }

    async fn payload_view(
        &self,
        id: Option<&str>,
        options: &TranscriptOptions,
    ) -> Result<Option<PayloadView>, VigilError> {
        if options.payload_level == PayloadLevel::None {
            return Ok(None);
        }
        let Some(id) = id else {
            return Ok(None);
        };
        let payload = self
            .payloads
            .get(id)
            .await?
            .ok_or_else(|| VigilError::not_found("payload", id))?;
        Ok(shape_payload(payload, options, &self.redaction))
    }
}

/// Stable sort on (turn id, sequence, created at); equal keys keep storage order.
pub(crate) fn sort_rows(rows: &mut [Message]) {
    rows.sort_by(|a, b| {
        (a.turn_id.as_deref(), a.sequence, a.created_at).cmp(&(
            b.turn_id.as_deref(),
            b.sequence,
            b.created_at,
        ))
    });
}

/// Drop every tool call that is not the highest attempt for its op id
/// within its turn. On equal attempts the later row wins.
fn keep_latest_attempts(entries: &mut [Entry]) {
    let mut winners: HashMap<(Option<String>, String), (u32, usize)> = HashMap::new();
    for (idx, entry) in entries.iter().enumerate() {
        if let Some(call) = &entry.tool_call {
            let slot = winners
                .entry(attempt_key(entry, call))
                .or_insert((call.attempt, idx));
            if call.attempt >= slot.0 {
                *slot = (call.attempt, idx);
            }
        }
    }
    for (idx, entry) in entries.iter_mut().enumerate() {
        let superseded = entry.tool_call.as_ref().is_some_and(|call| {
            winners
                .get(&attempt_key(entry, call))
                .is_some_and(|&(_, win)| win != idx)
        });
        if superseded {
            entry.tool_call = None;
        }
    }
}

/// Op ids are only unique inside one turn.
fn attempt_key(entry: &Entry, call: &ToolCallTrace) -> (Option<String>, String) {
    let turn = entry
        .message
        .turn_id
        .clone()
        .or_else(|| call.turn_id.clone());
    (turn, call.op_id.clone())
}

/// Apply `since_id` then `limit`.
///
/// A `since_id` that is not in `items` yields an empty window; polling
/// callers read that as "nothing new yet". A limit of zero is no limit.
pub(crate) fn window<T>(
    items: Vec<T>,
    since_id: Option<&str>,
    limit: Option<usize>,
    id_of: impl Fn(&T) -> &str,
) -> Vec<T> {
    let mut items = match since_id {
        Some(since) => match items.iter().position(|item| id_of(item) == since) {
            Some(pos) => items.into_iter().skip(pos).collect(),
            None => Vec::new(),
        },
        None => items,
    };
    if let Some(limit) = limit.filter(|&l| l > 0) {
        items.truncate(limit);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::{CallStatus, Role};

    fn row(id: &str, turn: Option<&str>, seq: Option<i64>, secs: i64) -> Message {
        Message {
            id: id.into(),
            conversation_id: "c1".into(),
            turn_id: turn.map(str::to_string),
            sequence: seq,
            created_at: chrono::DateTime::from_timestamp(1_767_225_600 + secs, 0).unwrap(),
            role: Role::Assistant,
            kind: "text".into(),
            content: None,
            interim: false,
            tool_name: None,
            elicitation_id: None,
            status: None,
            model_call: None,
            tool_call: None,
        }
    }

    fn tool(op: &str, attempt: u32) -> ToolCallTrace {
        ToolCallTrace {
            message_id: "m".into(),
            turn_id: None,
            op_id: op.into(),
            attempt,
            tool_name: "shell".into(),
            tool_kind: None,
            status: CallStatus::Completed,
            error_code: None,
            error_message: None,
            cost: None,
            started_at: None,
            completed_at: None,
            request: None,
            response: None,
        }
    }

    fn ids(rows: &[Message]) -> Vec<&str> {
        rows.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn sorts_by_turn_then_sequence_then_time() {
        let mut rows = vec![
            row("d", Some("t2"), Some(1), 0),
            row("c", Some("t1"), Some(2), 0),
            row("b", Some("t1"), Some(1), 5),
            row("a", Some("t1"), Some(1), 1),
        ];
        sort_rows(&mut rows);
        assert_eq!(ids(&rows), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn sort_keeps_insertion_order_on_ties() {
        let mut rows = vec![
            row("x", Some("t1"), Some(1), 0),
            row("y", Some("t1"), Some(1), 0),
            row("z", Some("t1"), Some(1), 0),
        ];
        sort_rows(&mut rows);
        assert_eq!(ids(&rows), vec!["x", "y", "z"]);
    }

    #[test]
    fn window_since_id_is_inclusive() {
        let out = window(vec!["a", "b", "c"], Some("b"), None, |s| *s);
        assert_eq!(out, vec!["b", "c"]);
    }

    #[test]
    fn window_unknown_since_id_is_empty() {
        // Current behavior: an unknown id and an id not yet in range look the same.
        let out = window(vec!["a", "b"], Some("zz"), None, |s| *s);
        assert!(out.is_empty());
    }

    #[test]
    fn window_limit_applies_after_since_id() {
        let out = window(vec!["a", "b", "c", "d"], Some("b"), Some(2), |s| *s);
        assert_eq!(out, vec!["b", "c"]);
        let unlimited = window(vec!["a", "b"], None, Some(0), |s| *s);
        assert_eq!(unlimited, vec!["a", "b"]);
    }

    #[test]
    fn only_highest_attempt_survives_per_op() {
        let mut entries: Vec<Entry> = [("op1", 1), ("op2", 1), ("op1", 3), ("op1", 2)]
            .into_iter()
            .enumerate()
            .map(|(i, (op, attempt))| Entry {
                message: row(&format!("m{i}"), Some("t1"), Some(i as i64), 0),
                model_call: None,
                tool_call: Some(tool(op, attempt)),
            })
            .collect();

        keep_latest_attempts(&mut entries);

        let kept: Vec<(&str, u32)> = entries
            .iter()
            .filter_map(|e| e.tool_call.as_ref())
            .map(|t| (t.op_id.as_str(), t.attempt))
            .collect();
        assert_eq!(kept, vec![("op2", 1), ("op1", 3)]);
        assert_eq!(entries.len(), 4, "messages themselves are kept");
    }

    #[test]
    fn op_ids_reused_across_turns_dedup_separately() {
        let mut entries: Vec<Entry> = [("t1", 2), ("t2", 1)]
            .into_iter()
            .enumerate()
            .map(|(i, (turn, attempt))| Entry {
                message: row(&format!("m{i}"), Some(turn), Some(1), 0),
                model_call: None,
                tool_call: Some(tool("call_0", attempt)),
            })
            .collect();

        keep_latest_attempts(&mut entries);

        assert!(entries.iter().all(|e| e.tool_call.is_some()));
    }
}
