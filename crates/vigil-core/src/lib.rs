// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Vigil, the conversation transcript and live-progress service.
//!
//! This crate provides the record types written by the execution pipeline,
//! the shared error type, and the repository traits that storage backends
//! implement so the aggregator, stage inference, and payload delivery can
//! read them.

pub mod error;
pub mod events;
pub mod serde_base64;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::VigilError;
pub use events::{EventPayload, ExecutionEvent};
pub use types::{
    CallStatus, Compression, Message, ModelCallTrace, Payload, PayloadRef,
    PayloadStorage, Role, Stage, ToolCallTrace,
};

pub use traits::{
    MessageFilter, MessageRepository, ModelCallRepository, PayloadRepository, ToolCallRepository,
    TraceFilter,
};
