// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Successful JSON responses use the `{"status":"ok","data":...}` envelope;
//! failures use `{"status":"ERROR","message":...}`.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vigil_core::{Stage, VigilError};
use vigil_payload::DeliveryStatus;
use vigil_security::RedactionPolicy;
use vigil_transcript::{shape_payload, PayloadLevel, PayloadView, TranscriptOptions};

use crate::error::ApiError;
use crate::server::{GatewayState, TranscriptDefaults};

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { status: "ok", data }
    }
}

/// Error envelope.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "ERROR",
            message: message.into(),
        }
    }
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Conversations with at least one live event subscriber.
    pub streaming_conversations: usize,
}

/// Response data for GET /v1/conversations/{id}/stage.
#[derive(Debug, Serialize)]
pub struct StageResponse {
    pub stage: Stage,
}

/// Query string of GET /v1/conversations/{id}/transcript.
///
/// Values stay strings so flags can be written as `1`, `true`, or bare.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptQuery {
    pub exclude_interim: Option<String>,
    pub include_tools: Option<String>,
    pub include_model_calls: Option<String>,
    pub include_tool_calls: Option<String>,
    pub payload_level: Option<String>,
    pub payload_inline_max_b: Option<String>,
    pub redact: Option<String>,
    pub since: Option<String>,
    pub since_id: Option<String>,
    pub limit: Option<String>,
    pub turn_id: Option<String>,
}

impl TranscriptQuery {
    /// Whether the caller asked for traces or payloads rather than plain rows.
    pub fn wants_aggregate(&self) -> bool {
        self.include_model_calls.is_some()
            || self.include_tool_calls.is_some()
            || self.payload_level.is_some()
    }

    pub fn to_options(&self, defaults: &TranscriptDefaults) -> Result<TranscriptOptions, ApiError> {
        let base = TranscriptOptions::default();
        let payload_level = match self.payload_level.as_deref() {
            Some(level) => level.parse::<PayloadLevel>().map_err(|_| {
                ApiError::BadRequest(format!(
                    "payloadLevel must be one of none, preview, inline_if_small, full; got `{level}`"
                ))
            })?,
            None => defaults.payload_level,
        };
        let payload_inline_max_bytes = match self.payload_inline_max_b.as_deref() {
            Some(value) => parse_number("payloadInlineMaxB", value)?,
            None => defaults.payload_inline_max_bytes,
        };
        let since = self
            .since
            .as_deref()
            .map(|value| {
                DateTime::parse_from_rfc3339(value)
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(|e| ApiError::BadRequest(format!("since must be RFC 3339: {e}")))
            })
            .transpose()?;
        let limit = self
            .limit
            .as_deref()
            .map(|value| parse_number("limit", value))
            .transpose()?;

        Ok(TranscriptOptions {
            exclude_interim: flag("excludeInterim", &self.exclude_interim)?
                .unwrap_or(base.exclude_interim),
            include_tools: flag("includeTools", &self.include_tools)?.unwrap_or(base.include_tools),
            include_model_calls: flag("includeModelCalls", &self.include_model_calls)?
                .unwrap_or(false),
            include_tool_calls: flag("includeToolCalls", &self.include_tool_calls)?
                .unwrap_or(false),
            payload_level,
            payload_inline_max_bytes,
            redact_sensitive: flag("redact", &self.redact)?.unwrap_or(false),
            since,
            since_id: self.since_id.clone().filter(|id| !id.is_empty()),
            limit,
        })
    }
}

/// Query string of GET /v1/payloads/{id}.
#[derive(Debug, Default, Deserialize)]
pub struct PayloadQuery {
    pub raw: Option<String>,
}

fn flag(name: &str, value: &Option<String>) -> Result<Option<bool>, ApiError> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        other => Err(ApiError::BadRequest(format!(
            "{name} must be a boolean; got `{other}`"
        ))),
    }
}

fn parse_number(name: &str, value: &str) -> Result<usize, ApiError> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("{name} must be a non-negative integer; got `{value}`")))
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        streaming_conversations: state.bus.conversation_count(),
    })
}

/// GET /v1/conversations/{id}/transcript
///
/// Plain message rows unless traces or a payload level are requested.
pub async fn get_transcript(
    State(state): State<GatewayState>,
    Path(conversation_id): Path<String>,
    Query(query): Query<TranscriptQuery>,
) -> Result<Response, ApiError> {
    let options = query.to_options(&state.defaults)?;
    let transcript = state
        .aggregator
        .aggregate(&conversation_id, query.turn_id.as_deref(), &options)
        .await?;

    if query.wants_aggregate() {
        Ok(Json(ApiResponse::ok(transcript)).into_response())
    } else {
        Ok(Json(ApiResponse::ok(transcript.into_rows())).into_response())
    }
}

/// GET /v1/conversations/{id}/stage
pub async fn get_stage(
    State(state): State<GatewayState>,
    Path(conversation_id): Path<String>,
) -> Json<ApiResponse<StageResponse>> {
    let stage = state.stage.infer(&conversation_id).await;
    Json(ApiResponse::ok(StageResponse { stage }))
}

/// GET /v1/payloads/{id}
///
/// Metadata by default; `?raw=1` serves the body, honoring `Range`.
pub async fn get_payload(
    State(state): State<GatewayState>,
    Path(payload_id): Path<String>,
    Query(query): Query<PayloadQuery>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if !flag("raw", &query.raw)?.unwrap_or(false) {
        let view = payload_metadata(&state, &payload_id).await?;
        return Ok(Json(ApiResponse::ok(view)).into_response());
    }

    // Undecodable header bytes fail range parsing like any other junk.
    let range = headers
        .get(header::RANGE)
        .map(|value| value.to_str().unwrap_or_default());
    let served = state.payloads.serve(&payload_id, range).await?;

    let status = StatusCode::from_u16(served.status.code()).unwrap_or(StatusCode::OK);
    let mut builder = Response::builder()
        .status(status)
        .header(header::ACCEPT_RANGES, "bytes");
    if served.status != DeliveryStatus::NoContent {
        builder = builder
            .header(header::CONTENT_TYPE, served.content_type)
            .header(header::CONTENT_LENGTH, served.body.len());
    }
    if let Some(content_range) = served.content_range {
        builder = builder.header(header::CONTENT_RANGE, content_range);
    }
    builder
        .body(Body::from(served.body))
        .map_err(|e| ApiError::Vigil(VigilError::Internal(format!("failed to build response: {e}"))))
}

async fn payload_metadata(state: &GatewayState, payload_id: &str) -> Result<PayloadView, ApiError> {
    let payload = state.payloads.metadata(payload_id).await?;
    let options = TranscriptOptions {
        payload_level: PayloadLevel::Preview,
        redact_sensitive: true,
        ..TranscriptOptions::default()
    };
    shape_payload(payload, &options, &RedactionPolicy::default())
        .ok_or_else(|| ApiError::Vigil(VigilError::Internal("payload view unavailable".into())))
}
