// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end delivery against real fetchers.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use vigil_payload::{
    DeliveryError, FetchError, ObjectFetcher, PayloadServer, SchemeRouter,
};
use vigil_test_utils::MemoryStore;
use vigil_test_utils::fixtures::{gzip, object_payload};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Never answers within any reasonable deadline.
struct StalledFetcher;

#[async_trait]
impl ObjectFetcher for StalledFetcher {
    async fn fetch(&self, _uri: &str) -> Result<Vec<u8>, FetchError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Vec::new())
    }
}

fn store_with_object(uri: &str) -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    store.add_payload(object_payload("p-obj", uri, 11));
    store.shared()
}

#[tokio::test]
async fn http_object_range_request() {
    let remote = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/objects/p-obj"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ABCDEFGHIJK".to_vec()))
        .mount(&remote)
        .await;

    let uri = format!("{}/objects/p-obj", remote.uri());
    let server = PayloadServer::new(
        store_with_object(&uri),
        Arc::new(SchemeRouter::standard(1024)),
    );

    let response = server.serve("p-obj", Some("bytes=6-")).await.unwrap();
    assert_eq!(response.status.code(), 206);
    assert_eq!(response.content_range.as_deref(), Some("bytes 6-10/11"));
    assert_eq!(response.body, b"GHIJK");
}

#[tokio::test]
async fn gzip_object_is_inflated_before_slicing() {
    let remote = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/objects/p-obj"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gzip(b"ABCDEFGHIJK")))
        .mount(&remote)
        .await;

    let store = MemoryStore::new();
    let mut payload = object_payload("p-obj", &format!("{}/objects/p-obj", remote.uri()), 11);
    payload.compression = vigil_core::Compression::Gzip;
    store.add_payload(payload);

    let server = PayloadServer::new(store.shared(), Arc::new(SchemeRouter::standard(1024)));
    let response = server.serve("p-obj", Some("bytes=0-2")).await.unwrap();
    assert_eq!(response.body, b"ABC");
    assert_eq!(response.content_range.as_deref(), Some("bytes 0-2/11"));
}

#[tokio::test]
async fn remote_error_status_is_bad_gateway() {
    let remote = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&remote)
        .await;

    let server = PayloadServer::new(
        store_with_object(&format!("{}/objects/p-obj", remote.uri())),
        Arc::new(SchemeRouter::standard(1024)),
    );
    let err = server.serve("p-obj", None).await.unwrap_err();
    assert!(matches!(err, DeliveryError::BadGateway { .. }));
    assert_eq!(err.status_code(), 502);
}

#[tokio::test]
async fn unknown_scheme_is_bad_gateway() {
    let server = PayloadServer::new(
        store_with_object("s3://bucket/p-obj"),
        Arc::new(SchemeRouter::standard(1024)),
    );
    let err = server.serve("p-obj", None).await.unwrap_err();
    assert_eq!(err.status_code(), 502);
    assert!(err.to_string().contains("s3"));
}

#[tokio::test(start_paused = true)]
async fn stalled_fetch_is_gateway_timeout() {
    let server = PayloadServer::new(store_with_object("s3://bucket/p-obj"), Arc::new(StalledFetcher))
        .with_fetch_timeout(Duration::from_secs(10));
    let err = server.serve("p-obj", Some("bytes=0-1")).await.unwrap_err();
    assert!(matches!(
        err,
        DeliveryError::GatewayTimeout { after } if after == Duration::from_secs(10)
    ));
    assert_eq!(err.status_code(), 504);
}
