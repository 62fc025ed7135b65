//! Error types for the caching API client
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

// == API Error Enum ==
/// Unified error type for API calls made through the orchestrator.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Required filter parameters missing for a protected master-data endpoint
    #[error("{0}")]
    Validation(String),

    /// HTTP method outside GET/POST/PUT/DELETE
    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// Transport-level failure (connection refused, timeout, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// Upstream answered with a non-2xx status
    #[error("HTTP {status} {status_text}")]
    Http {
        status: u16,
        status_text: String,
        body: Value,
    },

    /// Malformed request received on the proxy surface
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::UnsupportedMethod(_) => (
                StatusCode::METHOD_NOT_ALLOWED,
                json!({ "error": self.to_string() }),
            ),
            ApiError::InvalidRequest(_) => {
                (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() }))
            }
            ApiError::Network(_) => (StatusCode::BAD_GATEWAY, json!({ "error": self.to_string() })),
            ApiError::Http { status, body, .. } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                json!({ "error": self.to_string(), "details": body }),
            ),
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": self.to_string() }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the API client.
pub type Result<T> = std::result::Result<T, ApiError>;
