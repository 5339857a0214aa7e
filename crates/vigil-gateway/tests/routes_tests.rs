// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Route-level tests driving the router without a listener.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use futures::StreamExt;
use serde_json::Value;
use tower::ServiceExt;

use vigil_config::VigilConfig;
use vigil_core::{CallStatus, EventPayload, ExecutionEvent, PayloadRef, Role, Stage};
use vigil_gateway::{router, GatewayState, Repositories};
use vigil_payload::{FetchError, ObjectFetcher};
use vigil_test_utils::fixtures::{inline_payload, message, model_call, object_payload, tool_call};
use vigil_test_utils::{MemoryStore, Operation};

/// Serves one fixed body for every uri.
struct StaticFetcher(&'static [u8]);

#[async_trait]
impl ObjectFetcher for StaticFetcher {
    async fn fetch(&self, _uri: &str) -> Result<Vec<u8>, FetchError> {
        Ok(self.0.to_vec())
    }
}

fn seeded() -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    store.add_message(message("m1", "c1", "t1", 1, Role::User));

    let mut m2 = message("m2", "c1", "t1", 2, Role::Assistant);
    let mut call = model_call("m2", CallStatus::Completed);
    call.request_payload_id = Some("p-digits".into());
    m2.model_call = Some(call);
    store.add_message(m2);

    let mut m3 = message("m3", "c1", "t1", 3, Role::Tool);
    m3.tool_name = Some("shell".into());
    store.add_message(m3);
    let mut attempt = tool_call("m3", "op-1", 1, CallStatus::Running);
    attempt.response = Some(PayloadRef::Id("p-object".into()));
    store.add_tool_call(attempt);

    store.add_payload(inline_payload("p-digits", b"0123456789"));
    store.add_payload(object_payload("p-object", "s3://bucket/p-object", 11));
    let mut secret = inline_payload("p-secret", b"hunter2");
    secret.redacted = true;
    store.add_payload(secret);
    store.shared()
}

fn state_for(store: Arc<MemoryStore>) -> GatewayState {
    GatewayState::with_fetcher(
        Repositories::from_store(store),
        &VigilConfig::default(),
        Arc::new(StaticFetcher(b"ABCDEFGHIJK")),
    )
}

fn app(store: Arc<MemoryStore>) -> Router {
    router(state_for(store))
}

async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn get_ranged(app: Router, uri: &str, range: &str) -> Response {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .header(header::RANGE, range)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn health_reports_version() {
    let response = get(app(seeded()), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn transcript_without_trace_flags_returns_plain_rows() {
    let response = get(app(seeded()), "/v1/conversations/c1/transcript").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    let rows = json["data"].as_array().unwrap();
    let ids: Vec<&str> = rows.iter().map(|r| r["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["m1", "m2"]);
    assert!(rows[1].get("modelCall").is_none());
}

#[tokio::test]
async fn transcript_with_traces_is_aggregated() {
    let uri = "/v1/conversations/c1/transcript?includeTools=1&includeModelCalls=1\
               &includeToolCalls=1&payloadLevel=full";
    let json = body_json(get(app(seeded()), uri).await).await;
    let data = &json["data"];
    assert_eq!(data["conversationId"], "c1");

    let messages = data["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1]["modelCall"]["requestPayload"]["inlineBody"], "MDEyMzQ1Njc4OQ==");
    assert_eq!(messages[2]["toolCall"]["status"], "running");
    assert_eq!(messages[2]["toolCall"]["responsePayload"]["storage"], "object");
}

#[tokio::test]
async fn transcript_since_id_and_limit() {
    let uri = "/v1/conversations/c1/transcript?includeTools=true&sinceId=m2&limit=1";
    let json = body_json(get(app(seeded()), uri).await).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], "m2");
}

#[tokio::test]
async fn transcript_bad_query_is_400() {
    let response = get(
        app(seeded()),
        "/v1/conversations/c1/transcript?payloadLevel=everything",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ERROR");
    assert!(json["message"].as_str().unwrap().contains("payloadLevel"));
}

#[tokio::test]
async fn transcript_repository_failure_is_500() {
    let store = seeded();
    store.fail_on(Operation::Transcript);
    let response = get(app(store), "/v1/conversations/c1/transcript").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["status"], "ERROR");
}

#[tokio::test]
async fn missing_referenced_payload_is_404() {
    let store = MemoryStore::new();
    let mut m1 = message("m1", "c1", "t1", 1, Role::Assistant);
    let mut call = model_call("m1", CallStatus::Completed);
    call.response_payload_id = Some("ghost".into());
    m1.model_call = Some(call);
    store.add_message(m1);

    let response = get(
        app(store.shared()),
        "/v1/conversations/c1/transcript?includeModelCalls=1&payloadLevel=preview",
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stage_endpoint_reports_executing_tool() {
    let json = body_json(get(app(seeded()), "/v1/conversations/c1/stage").await).await;
    assert_eq!(json, serde_json::json!({"status": "ok", "data": {"stage": "executing"}}));
}

#[tokio::test]
async fn stage_of_unknown_conversation_is_waiting() {
    let json = body_json(get(app(seeded()), "/v1/conversations/nobody/stage").await).await;
    assert_eq!(json["data"]["stage"], "waiting");
}

#[tokio::test]
async fn payload_metadata_omits_body() {
    let response = get(app(seeded()), "/v1/payloads/p-digits").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], "p-digits");
    assert_eq!(json["data"]["sizeBytes"], 10);
    assert!(json["data"].get("inlineBody").is_none());
}

#[tokio::test]
async fn redacted_payload_metadata_hides_preview() {
    let response = get(app(seeded()), "/v1/payloads/p-secret").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["redacted"], true);
    assert!(json["data"].get("preview").is_none());
    assert!(json["data"].get("inlineBody").is_none());
}

#[tokio::test]
async fn unknown_payload_is_404() {
    let response = get(app(seeded()), "/v1/payloads/nope?raw=1").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["status"], "ERROR");
}

#[tokio::test]
async fn raw_payload_range_is_206() {
    let response = get_ranged(app(seeded()), "/v1/payloads/p-digits?raw=1", "bytes=2-5").await;
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_RANGE], "bytes 2-5/10");
    assert_eq!(headers[header::ACCEPT_RANGES], "bytes");
    assert_eq!(headers[header::CONTENT_LENGTH], "4");
    assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
    assert_eq!(body_bytes(response).await, b"2345");
}

#[tokio::test]
async fn raw_object_open_range() {
    let response = get_ranged(app(seeded()), "/v1/payloads/p-object?raw=1", "bytes=6-").await;
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes 6-10/11");
    assert_eq!(body_bytes(response).await, b"GHIJK");
}

#[tokio::test]
async fn raw_payload_bad_range_is_416() {
    let response =
        get_ranged(app(seeded()), "/v1/payloads/p-digits?raw=1", "bytes=999-1000").await;
    assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(response.headers()[header::CONTENT_RANGE], "bytes */10");
}

#[tokio::test]
async fn raw_redacted_payload_is_empty_204() {
    let response = get_ranged(app(seeded()), "/v1/payloads/p-secret?raw=1", "bytes=0-3").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn raw_unknown_scheme_is_502() {
    let store = MemoryStore::new();
    store.add_payload(object_payload("p-s3", "s3://bucket/key", 3));
    let state = GatewayState::new(
        Repositories::from_store(store.shared()),
        &VigilConfig::default(),
    );
    let response = get(router(state), "/v1/payloads/p-s3?raw=1").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn events_stream_starts_with_stage_then_relays() {
    let state = state_for(seeded());
    let bus = state.bus.clone();
    let response = get(router(state), "/v1/conversations/c1/events").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");
    assert_eq!(bus.subscriber_count("c1"), 1);

    let mut frames = response.into_body().into_data_stream();
    let first = frames.next().await.unwrap().unwrap();
    let first = String::from_utf8_lossy(&first).into_owned();
    assert!(first.starts_with("event: stage\n"), "{first}");
    assert!(first.contains("\"data\":\"executing\""));

    bus.publish(ExecutionEvent::new("c1", EventPayload::Stage(Stage::Done)));
    let next = frames.next().await.unwrap().unwrap();
    let next = String::from_utf8_lossy(&next).into_owned();
    assert!(next.contains("\"data\":\"done\""), "{next}");

    drop(frames);
    assert_eq!(bus.subscriber_count("c1"), 0);
}
