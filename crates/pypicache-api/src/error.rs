//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps [`PackageCacheError`] to HTTP status codes and a JSON body of the
//! form `{"error": true, "code": "...", "message": "..."}`. Storage
//! failures are logged and answered with a generic message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pypicache_core::{PackageCacheError, ValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Always `true`.
    pub error: bool,
    /// Machine-readable error code (e.g. "NOT_FOUND").
    pub code: String,
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Package or file not found locally or upstream (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Missing form field or invalid name (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Artifact already stored (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Upstream index failure (502).
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: true,
            code: code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PackageCacheError> for AppError {
    fn from(err: PackageCacheError) -> Self {
        match err {
            PackageCacheError::NotFound(msg) => Self::NotFound(msg),
            PackageCacheError::Remote { endpoint, message } => {
                Self::Upstream(format!("{endpoint}: {message}"))
            }
            PackageCacheError::NotOverwriting(key) => {
                Self::Conflict(format!("not overwriting existing package {key}"))
            }
            PackageCacheError::Validation(e) => Self::BadRequest(e.to_string()),
            e @ (PackageCacheError::Storage(_) | PackageCacheError::Io(_)) => {
                Self::Internal(e.to_string())
            }
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::BadRequest(err.to_string())
    }
}
