// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Vigil transcript service.
//!
//! Exposes aggregated transcripts, stage inference, live execution events
//! (Server-Sent Events), and ranged payload bodies over axum. Storage is
//! supplied by the embedder through the `vigil-core` repository traits.

pub mod error;
pub mod handlers;
pub mod server;
pub mod sse;

pub use error::ApiError;
pub use server::{router, start_server, GatewayState, Repositories, ServerConfig};

use tracing_subscriber::EnvFilter;
use vigil_core::VigilError;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise Vigil crates log at `level` and
/// everything else at `warn`.
pub fn init_tracing(level: &str) -> Result<(), VigilError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => default_filter(level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .try_init()
        .map_err(|e| VigilError::Internal(format!("failed to install tracing subscriber: {e}")))
}

fn default_filter(level: &str) -> Result<EnvFilter, VigilError> {
    EnvFilter::try_new(format!("vigil={level},warn"))
        .map_err(|e| VigilError::Config(format!("invalid log level `{level}`: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_levels_build_a_filter() {
        for level in ["trace", "debug", "info", "warn", "error"] {
            assert!(default_filter(level).is_ok(), "{level}");
        }
    }

    #[test]
    fn unknown_level_is_a_config_error() {
        let err = default_filter("loud").unwrap_err();
        assert!(matches!(err, VigilError::Config(_)));
        assert!(err.to_string().contains("loud"));
    }
}
