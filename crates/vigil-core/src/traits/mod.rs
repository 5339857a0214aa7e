// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits for the persistence layer.
//!
//! Vigil never writes records. Storage backends implement these traits and
//! use `#[async_trait]` for dynamic dispatch compatibility.

pub mod messages;
pub mod payloads;
pub mod traces;

pub use messages::{MessageFilter, MessageRepository};
pub use payloads::PayloadRepository;
pub use traces::{ModelCallRepository, ToolCallRepository, TraceFilter};
