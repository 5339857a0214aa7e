// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serves payload bodies with byte-range support.
//!
//! Redacted payloads and records with an unrecognised storage mode answer
//! with an empty 204 before any range handling, so no bytes ever leave for
//! them. Inline and object bodies are decompressed first; ranges are
//! resolved against the decompressed length.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use vigil_core::{Payload, PayloadRepository, PayloadStorage};

use crate::decompress::decompress;
use crate::error::DeliveryError;
use crate::fetch::ObjectFetcher;
use crate::range::{RangeError, RangeSpec};

/// Deadline for one remote object read.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Largest body served from object storage, after decompression.
pub const DEFAULT_MAX_OBJECT_BYTES: u64 = 64 * 1024 * 1024;

/// Fallback `Content-Type` for payloads without a mime type.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// 200, whole body.
    Ok,
    /// 206, one range.
    PartialContent,
    /// 204, empty body.
    NoContent,
}

impl DeliveryStatus {
    pub fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::PartialContent => 206,
            Self::NoContent => 204,
        }
    }
}

/// A served body plus the headers that describe it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadResponse {
    pub status: DeliveryStatus,
    pub content_type: String,
    /// Set for partial content only.
    pub content_range: Option<String>,
    pub body: Vec<u8>,
}

impl PayloadResponse {
    fn no_content() -> Self {
        Self {
            status: DeliveryStatus::NoContent,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            content_range: None,
            body: Vec::new(),
        }
    }
}

/// Resolves payload records and serves their bodies.
pub struct PayloadServer {
    payloads: Arc<dyn PayloadRepository>,
    fetcher: Arc<dyn ObjectFetcher>,
    fetch_timeout: Duration,
    max_object_bytes: u64,
}

impl PayloadServer {
    pub fn new(payloads: Arc<dyn PayloadRepository>, fetcher: Arc<dyn ObjectFetcher>) -> Self {
        Self {
            payloads,
            fetcher,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_object_bytes: DEFAULT_MAX_OBJECT_BYTES,
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_max_object_bytes(mut self, max: u64) -> Self {
        self.max_object_bytes = max;
        self
    }

    /// Payload record without its body.
    pub async fn metadata(&self, id: &str) -> Result<Payload, DeliveryError> {
        self.payloads
            .get(id)
            .await?
            .ok_or_else(|| DeliveryError::NotFound { id: id.to_string() })
    }

    /// Serve the body of payload `id`, honoring an optional `Range` header value.
    pub async fn serve(
        &self,
        id: &str,
        range: Option<&str>,
    ) -> Result<PayloadResponse, DeliveryError> {
        let payload = self.metadata(id).await?;
        if payload.redacted {
            debug!(payload_id = id, "refusing body of redacted payload");
            return Ok(PayloadResponse::no_content());
        }

        // A malformed header is only reported once the total length is known.
        let spec = range.map(str::parse::<RangeSpec>).transpose();

        let content_type = payload
            .mime_type
            .clone()
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
        let stored = match payload.storage {
            PayloadStorage::Inline { body } => body,
            PayloadStorage::Object { uri } => self.fetch_object(id, &uri).await?,
            PayloadStorage::Unsupported { name } => {
                warn!(payload_id = id, storage = %name, "unsupported storage mode");
                return Ok(PayloadResponse::no_content());
            }
        };
        let body = decompress(stored, payload.compression, self.max_object_bytes).map_err(
            |source| DeliveryError::Decompress {
                id: id.to_string(),
                source,
            },
        )?;
        let total = body.len() as u64;

        let spec = match spec {
            Ok(spec) => spec,
            Err(e) => return Err(range_failure(id, total, &e)),
        };
        let Some(spec) = spec else {
            return Ok(PayloadResponse {
                status: DeliveryStatus::Ok,
                content_type,
                content_range: None,
                body,
            });
        };

        let range = spec.resolve(total).map_err(|e| range_failure(id, total, &e))?;
        Ok(PayloadResponse {
            status: DeliveryStatus::PartialContent,
            content_type,
            content_range: Some(range.content_range()),
            body: range.slice(&body).to_vec(),
        })
    }

    async fn fetch_object(&self, id: &str, uri: &str) -> Result<Vec<u8>, DeliveryError> {
        let body = match tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(uri)).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                warn!(payload_id = id, uri, error = %e, "object fetch failed");
                return Err(DeliveryError::BadGateway {
                    message: e.to_string(),
                });
            }
            Err(_) => {
                warn!(payload_id = id, uri, timeout = ?self.fetch_timeout, "object fetch timed out");
                return Err(DeliveryError::GatewayTimeout {
                    after: self.fetch_timeout,
                });
            }
        };
        if body.len() as u64 > self.max_object_bytes {
            return Err(DeliveryError::BadGateway {
                message: format!("object {uri} exceeds {} bytes", self.max_object_bytes),
            });
        }
        Ok(body)
    }
}

fn range_failure(id: &str, total: u64, err: &RangeError) -> DeliveryError {
    debug!(payload_id = id, total, error = %err, "range not satisfiable");
    DeliveryError::RangeNotSatisfiable { total }
}
