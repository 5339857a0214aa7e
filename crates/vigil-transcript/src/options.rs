// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caller-selected inclusion, redaction, and windowing policy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How much of a referenced payload body is embedded in the transcript.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PayloadLevel {
    /// Omit payloads entirely.
    None,
    /// Metadata and the precomputed preview string, no body.
    #[default]
    Preview,
    /// Body only when it fits under `payload_inline_max_bytes`.
    InlineIfSmall,
    /// Body as stored.
    Full,
}

/// Options recognized by [`crate::TranscriptAggregator::aggregate`].
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptOptions {
    pub exclude_interim: bool,
    pub include_tools: bool,
    pub include_model_calls: bool,
    pub include_tool_calls: bool,
    pub payload_level: PayloadLevel,
    /// Threshold used only by [`PayloadLevel::InlineIfSmall`].
    pub payload_inline_max_bytes: usize,
    /// Strip bodies of payloads flagged redacted and mask sensitive keys.
    pub redact_sensitive: bool,
    /// Keep messages created at or after this instant.
    pub since: Option<DateTime<Utc>>,
    /// Inclusive slice start. An id missing from the window yields no rows.
    pub since_id: Option<String>,
    /// Maximum number of messages returned. Zero means unlimited.
    pub limit: Option<usize>,
}

impl Default for TranscriptOptions {
    fn default() -> Self {
        Self {
            exclude_interim: true,
            include_tools: false,
            include_model_calls: false,
            include_tool_calls: false,
            payload_level: PayloadLevel::default(),
            payload_inline_max_bytes: 8 * 1024,
            redact_sensitive: false,
            since: None,
            since_id: None,
            limit: None,
        }
    }
}

impl TranscriptOptions {
    /// Everything stage inference needs: all final rows with their traces, no bodies.
    pub fn for_stage() -> Self {
        Self {
            include_tools: true,
            include_model_calls: true,
            include_tool_calls: true,
            payload_level: PayloadLevel::None,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn defaults_hide_interim_and_tools() {
        let opts = TranscriptOptions::default();
        assert!(opts.exclude_interim);
        assert!(!opts.include_tools);
        assert!(!opts.include_model_calls);
        assert_eq!(opts.payload_level, PayloadLevel::Preview);
    }

    #[test]
    fn payload_level_parses_wire_names() {
        assert_eq!(
            PayloadLevel::from_str("inline_if_small").unwrap(),
            PayloadLevel::InlineIfSmall
        );
        assert_eq!(PayloadLevel::Full.to_string(), "full");
        assert!(PayloadLevel::from_str("everything").is_err());
    }
}
