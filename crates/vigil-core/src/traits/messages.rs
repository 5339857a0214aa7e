// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::VigilError;
use crate::types::{Message, Role};

/// Filters a repository may apply server-side.
///
/// Backends that cannot honour a filter may ignore it; callers re-apply
/// every filter to the rows they get back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageFilter {
    pub conversation_id: Option<String>,
    pub turn_id: Option<String>,
    pub exclude_interim: bool,
    /// When false, `tool` rows may be dropped by the backend.
    pub include_tools: bool,
    /// Keep only rows created at or after this instant.
    pub since: Option<DateTime<Utc>>,
}

impl MessageFilter {
    /// Whether a row passes this filter. Used for client-side re-filtering.
    pub fn matches(&self, msg: &Message) -> bool {
        if let Some(conversation_id) = &self.conversation_id {
            if &msg.conversation_id != conversation_id {
                return false;
            }
        }
        if let Some(turn_id) = &self.turn_id {
            if msg.turn_id.as_ref() != Some(turn_id) {
                return false;
            }
        }
        if self.exclude_interim && msg.interim {
            return false;
        }
        if !self.include_tools && msg.role == Role::Tool {
            return false;
        }
        if let Some(since) = self.since {
            if msg.created_at < since {
                return false;
            }
        }
        true
    }
}

/// Read access to recorded messages.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// List messages matching the filter, in storage order.
    async fn list(&self, filter: &MessageFilter) -> Result<Vec<Message>, VigilError>;

    /// Ordered rows for a conversation, optionally narrowed to one turn.
    async fn transcript(
        &self,
        conversation_id: &str,
        turn_id: Option<&str>,
        filter: &MessageFilter,
    ) -> Result<Vec<Message>, VigilError>;
}
