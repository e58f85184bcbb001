use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::errors::RelayError;

/// HTTP-facing error: a status and a message safe to show to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn endpoint_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Endpoint not found")
    }

    /// Upstream details go to the log only; the client gets `context`.
    pub fn from_relay(err: RelayError, context: &str) -> Self {
        error!("{}: {}", context, err);
        match err.upstream_status() {
            Some(status) if status == StatusCode::NOT_FOUND => {
                Self::new(StatusCode::NOT_FOUND, "Resource not found")
            }
            _ => Self::new(StatusCode::INTERNAL_SERVER_ERROR, context),
        }
    }

    /// Like `from_relay` but always 500, for responses combining several
    /// upstream resources.
    pub fn internal(err: RelayError, context: &str) -> Self {
        error!("{}: {}", context, err);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, context)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
