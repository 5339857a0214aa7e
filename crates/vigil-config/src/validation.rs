// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks run after deserialization.

use crate::diagnostic::ConfigError;
use crate::model::VigilConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
const PAYLOAD_LEVELS: &[&str] = &["none", "preview", "inline_if_small", "full"];

/// Validate a deserialized configuration. Collects every failure instead of
/// stopping at the first.
pub fn validate_config(config: &VigilConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.delivery.fetch_timeout_secs == 0 {
        fail("delivery.fetch_timeout_secs must be at least 1".to_string());
    }

    if config.delivery.max_object_bytes == 0 {
        fail("delivery.max_object_bytes must be at least 1".to_string());
    }

    if config.streaming.subscriber_queue_size == 0 {
        fail("streaming.subscriber_queue_size must be at least 1".to_string());
    }

    if !PAYLOAD_LEVELS.contains(&config.transcript.default_payload_level.as_str()) {
        fail(format!(
            "transcript.default_payload_level `{}` is not one of {}",
            config.transcript.default_payload_level,
            PAYLOAD_LEVELS.join(", ")
        ));
    }

    if config.gateway.host.trim().is_empty() {
        fail("gateway.host must not be empty".to_string());
    }

    if !LOG_LEVELS.contains(&config.logging.level.to_ascii_lowercase().as_str()) {
        fail(format!(
            "logging.level `{}` is not one of {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        ));
    }

    for (i, key) in config.redaction.keys.iter().enumerate() {
        if key.trim().is_empty() {
            fail(format!("redaction.keys[{i}] must not be empty"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
