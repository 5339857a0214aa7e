// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transcript reconstruction for Vigil.
//!
//! [`TranscriptAggregator`] joins recorded messages, model calls, tool calls,
//! and payloads into an [`AggregatedTranscript`] under caller-selected
//! [`TranscriptOptions`]. [`StageInference`] classifies the live phase of a
//! conversation from the same records.

pub mod aggregator;
pub mod options;
pub mod shape;
pub mod stage;
pub mod view;

pub use aggregator::TranscriptAggregator;
pub use options::{PayloadLevel, TranscriptOptions};
pub use shape::shape_payload;
pub use stage::{classify, StageInference};
pub use view::{
    AggregatedMessage, AggregatedTranscript, ModelCallView, PayloadView, ToolCallView,
};
