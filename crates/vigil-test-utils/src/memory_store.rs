// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory implementation of every repository trait.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;

use vigil_core::{
    Message, MessageFilter, MessageRepository, ModelCallRepository, ModelCallTrace, Payload,
    PayloadRepository, ToolCallRepository, ToolCallTrace, TraceFilter, VigilError,
};

/// A repository operation, for failure injection and call counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListMessages,
    Transcript,
    ListModelCalls,
    ListToolCalls,
    GetPayload,
}

#[derive(Default)]
struct Records {
    messages: Vec<Message>,
    model_calls: Vec<ModelCallTrace>,
    tool_calls: Vec<ToolCallTrace>,
    payloads: Vec<Payload>,
}

/// Records kept in insertion order.
///
/// By default `transcript` applies the filter it is given, like a SQL
/// backend would. [`MemoryStore::without_server_filters`] returns every row
/// of the conversation instead, to exercise client-side filtering.
pub struct MemoryStore {
    records: RwLock<Records>,
    failing: Mutex<HashSet<Operation>>,
    calls: Mutex<Vec<Operation>>,
    server_filters: bool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Records::default()),
            failing: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
            server_filters: true,
        }
    }

    /// A store whose `transcript` ignores filters.
    pub fn without_server_filters() -> Self {
        Self {
            server_filters: false,
            ..Self::new()
        }
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn add_message(&self, msg: Message) {
        self.write().messages.push(msg);
    }

    pub fn add_model_call(&self, trace: ModelCallTrace) {
        self.write().model_calls.push(trace);
    }

    pub fn add_tool_call(&self, trace: ToolCallTrace) {
        self.write().tool_calls.push(trace);
    }

    pub fn add_payload(&self, payload: Payload) {
        self.write().payloads.push(payload);
    }

    /// Make every later call of `op` fail with a storage error.
    pub fn fail_on(&self, op: Operation) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(op);
    }

    /// How many times `op` has been called.
    pub fn call_count(&self, op: Operation) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|&&c| c == op)
            .count()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Records> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Records> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn enter(&self, op: Operation) -> Result<(), VigilError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(op);
        let failing = self
            .failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&op);
        if failing {
            return Err(VigilError::storage(std::io::Error::other(format!(
                "injected failure: {op:?}"
            ))));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn list(&self, filter: &MessageFilter) -> Result<Vec<Message>, VigilError> {
        self.enter(Operation::ListMessages)?;
        Ok(self
            .read()
            .messages
            .iter()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect())
    }

    async fn transcript(
        &self,
        conversation_id: &str,
        turn_id: Option<&str>,
        filter: &MessageFilter,
    ) -> Result<Vec<Message>, VigilError> {
        self.enter(Operation::Transcript)?;
        Ok(self
            .read()
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .filter(|m| {
                !self.server_filters
                    || (turn_id.is_none_or(|t| m.turn_id.as_deref() == Some(t))
                        && filter.matches(m))
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ModelCallRepository for MemoryStore {
    async fn list(&self, filter: &TraceFilter) -> Result<Vec<ModelCallTrace>, VigilError> {
        self.enter(Operation::ListModelCalls)?;
        Ok(self
            .read()
            .model_calls
            .iter()
            .filter(|t| filter.matches(&t.message_id, t.turn_id.as_deref()))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ToolCallRepository for MemoryStore {
    async fn list(&self, filter: &TraceFilter) -> Result<Vec<ToolCallTrace>, VigilError> {
        self.enter(Operation::ListToolCalls)?;
        Ok(self
            .read()
            .tool_calls
            .iter()
            .filter(|t| filter.matches(&t.message_id, t.turn_id.as_deref()))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PayloadRepository for MemoryStore {
    async fn get(&self, id: &str) -> Result<Option<Payload>, VigilError> {
        self.enter(Operation::GetPayload)?;
        Ok(self.read().payloads.iter().find(|p| p.id == id).cloned())
    }
}
