// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use vigil_bus::EventBus;
use vigil_config::model::GatewayConfig;
use vigil_config::VigilConfig;
use vigil_core::{
    MessageRepository, ModelCallRepository, PayloadRepository, ToolCallRepository, VigilError,
};
use vigil_payload::{ObjectFetcher, PayloadServer, SchemeRouter};
use vigil_security::RedactionPolicy;
use vigil_transcript::{PayloadLevel, StageInference, TranscriptAggregator};

use crate::handlers;
use crate::sse;

/// The storage collaborators the gateway reads from.
#[derive(Clone)]
pub struct Repositories {
    pub messages: Arc<dyn MessageRepository>,
    pub model_calls: Arc<dyn ModelCallRepository>,
    pub tool_calls: Arc<dyn ToolCallRepository>,
    pub payloads: Arc<dyn PayloadRepository>,
}

impl Repositories {
    /// Use one store for every repository role.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: MessageRepository + ModelCallRepository + ToolCallRepository + PayloadRepository + 'static,
    {
        Self {
            messages: store.clone(),
            model_calls: store.clone(),
            tool_calls: store.clone(),
            payloads: store,
        }
    }
}

/// Transcript options applied when a request leaves them out.
#[derive(Debug, Clone, Copy)]
pub struct TranscriptDefaults {
    pub payload_level: PayloadLevel,
    pub payload_inline_max_bytes: usize,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub aggregator: Arc<TranscriptAggregator>,
    pub stage: StageInference,
    pub payloads: Arc<PayloadServer>,
    pub bus: EventBus,
    pub defaults: TranscriptDefaults,
}

impl GatewayState {
    /// Wire state from configuration, fetching objects over HTTP(S) and `file://`.
    pub fn new(repos: Repositories, config: &VigilConfig) -> Self {
        let fetcher = Arc::new(SchemeRouter::standard(config.delivery.max_object_bytes));
        Self::with_fetcher(repos, config, fetcher)
    }

    pub fn with_fetcher(
        repos: Repositories,
        config: &VigilConfig,
        fetcher: Arc<dyn ObjectFetcher>,
    ) -> Self {
        let redaction = RedactionPolicy::new(&config.redaction.keys);
        let aggregator = Arc::new(
            TranscriptAggregator::new(
                repos.messages,
                repos.model_calls,
                repos.tool_calls,
                Arc::clone(&repos.payloads),
            )
            .with_redaction(redaction),
        );
        let payloads = PayloadServer::new(repos.payloads, fetcher)
            .with_fetch_timeout(Duration::from_secs(config.delivery.fetch_timeout_secs))
            .with_max_object_bytes(config.delivery.max_object_bytes);

        Self {
            stage: StageInference::new(Arc::clone(&aggregator)),
            aggregator,
            payloads: Arc::new(payloads),
            bus: EventBus::new(config.streaming.subscriber_queue_size),
            defaults: TranscriptDefaults {
                payload_level: config
                    .transcript
                    .default_payload_level
                    .parse()
                    .unwrap_or_default(),
                payload_inline_max_bytes: config.transcript.payload_inline_max_bytes,
            },
        }
    }
}

/// Gateway bind address.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl From<&GatewayConfig> for ServerConfig {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
        }
    }
}

/// All routes, without binding a listener.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route(
            "/v1/conversations/{id}/transcript",
            get(handlers::get_transcript),
        )
        .route("/v1/conversations/{id}/stage", get(handlers::get_stage))
        .route("/v1/conversations/{id}/events", get(sse::stream_events))
        .route("/v1/payloads/{id}", get(handlers::get_payload))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `host:port` and serve until the listener fails.
pub async fn start_server(config: &ServerConfig, state: GatewayState) -> Result<(), VigilError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| VigilError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| VigilError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_test_utils::MemoryStore;

    #[test]
    fn state_takes_defaults_from_config() {
        let mut config = VigilConfig::default();
        config.transcript.default_payload_level = "inline_if_small".into();
        config.transcript.payload_inline_max_bytes = 512;
        config.streaming.subscriber_queue_size = 8;

        let state = GatewayState::new(Repositories::from_store(MemoryStore::new().shared()), &config);
        let _cloned = state.clone();
        assert_eq!(state.defaults.payload_level, PayloadLevel::InlineIfSmall);
        assert_eq!(state.defaults.payload_inline_max_bytes, 512);
        assert_eq!(state.bus.queue_size(), 8);
    }

    #[test]
    fn server_config_from_gateway_section() {
        let config = ServerConfig::from(&VigilConfig::default().gateway);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8686);
        assert!(format!("{config:?}").contains("127.0.0.1"));
    }
}
