// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model-call and tool-call repository traits.

use async_trait::async_trait;

use crate::error::VigilError;
use crate::types::{ModelCallTrace, ToolCallTrace};

/// Narrows a trace listing to one message or one turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceFilter {
    pub message_id: Option<String>,
    pub turn_id: Option<String>,
}

impl TraceFilter {
    pub fn for_message(message_id: impl Into<String>) -> Self {
        Self {
            message_id: Some(message_id.into()),
            turn_id: None,
        }
    }

    pub fn for_turn(turn_id: impl Into<String>) -> Self {
        Self {
            message_id: None,
            turn_id: Some(turn_id.into()),
        }
    }

    /// Whether a trace keyed by `(message_id, turn_id)` passes this filter.
    pub fn matches(&self, message_id: &str, turn_id: Option<&str>) -> bool {
        let message_ok = self
            .message_id
            .as_deref()
            .is_none_or(|wanted| wanted == message_id);
        let turn_ok = self
            .turn_id
            .as_deref()
            .is_none_or(|wanted| Some(wanted) == turn_id);
        message_ok && turn_ok
    }
}

/// Read access to recorded model invocations.
#[async_trait]
pub trait ModelCallRepository: Send + Sync {
    async fn list(&self, filter: &TraceFilter) -> Result<Vec<ModelCallTrace>, VigilError>;
}

/// Read access to recorded tool invocation attempts.
#[async_trait]
pub trait ToolCallRepository: Send + Sync {
    async fn list(&self, filter: &TraceFilter) -> Result<Vec<ToolCallTrace>, VigilError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_matches_everything() {
        assert!(TraceFilter::default().matches("m1", None));
        assert!(TraceFilter::default().matches("m1", Some("t1")));
    }

    #[test]
    fn message_and_turn_filters() {
        assert!(TraceFilter::for_message("m1").matches("m1", Some("t9")));
        assert!(!TraceFilter::for_message("m1").matches("m2", None));
        assert!(TraceFilter::for_turn("t1").matches("m5", Some("t1")));
        assert!(!TraceFilter::for_turn("t1").matches("m5", None));
    }
}
