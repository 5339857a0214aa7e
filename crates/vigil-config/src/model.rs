// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a mistyped key fails
//! at startup instead of being silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level Vigil configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VigilConfig {
    /// Transcript aggregation defaults.
    #[serde(default)]
    pub transcript: TranscriptConfig,

    /// Raw payload delivery settings.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Live event fan-out settings.
    #[serde(default)]
    pub streaming: StreamingConfig,

    /// Sensitive-key redaction applied to payload bodies.
    #[serde(default)]
    pub redaction: RedactionConfig,

    /// HTTP listener settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Defaults applied when a transcript request leaves a knob unset.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TranscriptConfig {
    /// Byte threshold for `inline_if_small` when the request gives none.
    #[serde(default = "default_payload_inline_max_bytes")]
    pub payload_inline_max_bytes: usize,

    /// Payload level used when the request asks for traces but names no level.
    #[serde(default = "default_payload_level")]
    pub default_payload_level: String,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            payload_inline_max_bytes: default_payload_inline_max_bytes(),
            default_payload_level: default_payload_level(),
        }
    }
}

fn default_payload_inline_max_bytes() -> usize {
    8 * 1024
}

fn default_payload_level() -> String {
    "preview".to_string()
}

/// Raw payload delivery.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Deadline for fetching an object-stored body.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Objects larger than this are refused.
    #[serde(default = "default_max_object_bytes")]
    pub max_object_bytes: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: default_fetch_timeout_secs(),
            max_object_bytes: default_max_object_bytes(),
        }
    }
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_max_object_bytes() -> u64 {
    64 * 1024 * 1024
}

/// Live event fan-out.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StreamingConfig {
    /// Events buffered per subscriber before new ones are dropped for it.
    #[serde(default = "default_subscriber_queue_size")]
    pub subscriber_queue_size: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            subscriber_queue_size: default_subscriber_queue_size(),
        }
    }
}

fn default_subscriber_queue_size() -> usize {
    64
}

/// JSON keys whose values are masked when sensitive redaction is requested.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RedactionConfig {
    #[serde(default = "default_redaction_keys")]
    pub keys: Vec<String>,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            keys: default_redaction_keys(),
        }
    }
}

fn default_redaction_keys() -> Vec<String> {
    [
        "api_key",
        "apikey",
        "authorization",
        "password",
        "secret",
        "token",
        "access_token",
        "refresh_token",
        "client_secret",
    ]
    .iter()
    .map(|k| k.to_string())
    .collect()
}

/// HTTP listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8686
}

/// Log output.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
