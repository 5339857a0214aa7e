// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Maps domain errors onto HTTP statuses and the error envelope.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use vigil_core::VigilError;
use vigil_payload::DeliveryError;

use crate::handlers::ErrorResponse;

#[derive(Debug)]
pub enum ApiError {
    /// A query parameter could not be parsed.
    BadRequest(String),
    /// Aggregation or repository failure.
    Vigil(VigilError),
    /// Payload body delivery failure.
    Delivery(DeliveryError),
}

impl From<VigilError> for ApiError {
    fn from(e: VigilError) -> Self {
        Self::Vigil(e)
    }
}

impl From<DeliveryError> for ApiError {
    fn from(e: DeliveryError) -> Self {
        Self::Delivery(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Vigil(VigilError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Vigil(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Delivery(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    fn message(&self) -> String {
        match self {
            Self::BadRequest(message) => message.clone(),
            Self::Vigil(e) => e.to_string(),
            Self::Delivery(e) => e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.message();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %message, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %message, "request rejected");
        }

        let content_range = match &self {
            Self::Delivery(e) => e.content_range(),
            _ => None,
        };
        let mut response = (status, Json(ErrorResponse::new(message))).into_response();
        if let Some(range) = content_range {
            if let Ok(value) = HeaderValue::from_str(&range) {
                response.headers_mut().insert(header::CONTENT_RANGE, value);
            }
        }
        response
    }
}
