// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Derives a conversation's live phase from the tail of its transcript.
//!
//! Rows are scanned newest first. The most recent row carrying a tool call,
//! the most recent assistant row, and the most recent row carrying a model
//! call are each checked once, in that priority; the first hit wins. If none
//! hits, the newest row alone decides between `Thinking`, `Error`, and `Done`.

use std::sync::Arc;

use tracing::warn;

use vigil_core::{Role, Stage};

use crate::aggregator::TranscriptAggregator;
use crate::options::TranscriptOptions;
use crate::view::AggregatedMessage;

/// Classify rows ordered oldest to newest. Never fails.
pub fn classify(rows: &[AggregatedMessage]) -> Stage {
    let Some(last) = rows.last() else {
        return Stage::Waiting;
    };

    let mut tool_checked = false;
    let mut assistant_checked = false;
    let mut model_checked = false;

    for row in rows.iter().rev() {
        if !tool_checked {
            if let Some(call) = &row.tool_call {
                tool_checked = true;
                if call.trace.is_running() {
                    return Stage::Executing;
                }
            }
        }
        if !assistant_checked && row.message.role == Role::Assistant {
            assistant_checked = true;
            if row.message.has_pending_elicitation() {
                return Stage::Eliciting;
            }
        }
        if !model_checked {
            if let Some(call) = &row.model_call {
                model_checked = true;
                if call.trace.is_running() {
                    return Stage::Thinking;
                }
            }
        }
        if tool_checked && assistant_checked && model_checked {
            break;
        }
    }

    if last.message.role == Role::User {
        return Stage::Thinking;
    }
    if last.tool_call.as_ref().is_some_and(|c| c.trace.is_failed()) {
        return Stage::Error;
    }
    Stage::Done
}

/// Reads a conversation through the aggregator and classifies it.
#[derive(Clone)]
pub struct StageInference {
    aggregator: Arc<TranscriptAggregator>,
}

impl StageInference {
    pub fn new(aggregator: Arc<TranscriptAggregator>) -> Self {
        Self { aggregator }
    }

    /// Current stage of a conversation. Any read failure degrades to `Waiting`.
    pub async fn infer(&self, conversation_id: &str) -> Stage {
        match self
            .aggregator
            .aggregate(conversation_id, None, &TranscriptOptions::for_stage())
            .await
        {
            Ok(transcript) => classify(&transcript.messages),
            Err(e) => {
                warn!(conversation_id, error = %e, "stage inference degraded to waiting");
                Stage::Waiting
            }
        }
    }
}
