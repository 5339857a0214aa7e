// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery error taxonomy.
//!
//! Each variant maps to one HTTP status at the boundary; timeouts and other
//! remote failures are kept apart so callers can answer 504 vs 502.

use std::time::Duration;

use thiserror::Error;
use vigil_core::VigilError;

#[derive(Debug, Error)]
pub enum DeliveryError {
    /// No payload record with this id.
    #[error("payload not found: {id}")]
    NotFound { id: String },

    /// Malformed, multi-part, or out-of-bounds range.
    #[error("range not satisfiable for {total}-byte payload")]
    RangeNotSatisfiable { total: u64 },

    /// The object store did not answer before the deadline.
    #[error("object fetch timed out after {after:?}")]
    GatewayTimeout { after: Duration },

    /// The object store answered with an error, or could not be reached.
    #[error("object fetch failed: {message}")]
    BadGateway { message: String },

    /// A gzip body failed to inflate.
    #[error("failed to decompress payload {id}: {source}")]
    Decompress {
        id: String,
        #[source]
        source: std::io::Error,
    },

    /// The payload repository itself failed.
    #[error(transparent)]
    Repository(#[from] VigilError),
}

impl DeliveryError {
    /// HTTP status code this error is reported with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::RangeNotSatisfiable { .. } => 416,
            Self::GatewayTimeout { .. } => 504,
            Self::BadGateway { .. } => 502,
            Self::Decompress { .. } | Self::Repository(_) => 500,
        }
    }

    /// `Content-Range` header value for unsatisfiable ranges.
    pub fn content_range(&self) -> Option<String> {
        match self {
            Self::RangeNotSatisfiable { total } => Some(format!("bytes */{total}")),
            _ => None,
        }
    }
}
