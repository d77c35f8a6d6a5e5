//! Error types for the feed backend
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Feed Error Enum ==
/// Unified error type for the feed backend.
#[derive(Error, Debug)]
pub enum FeedError {
    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request rejected by the rate governor
    #[error("Too many requests, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: i64 },

    /// A downstream collaborator is unavailable
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for FeedError {
    fn into_response(self) -> Response {
        match self {
            FeedError::RateLimited { retry_after_ms } => {
                let retry_after_ms = retry_after_ms.max(0);
                let retry_after_secs = (retry_after_ms + 999) / 1000;
                let body = Json(json!({
                    "error": "Too many requests",
                    "retryAfterMs": retry_after_ms,
                }));
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    [(header::RETRY_AFTER, retry_after_secs.to_string())],
                    body,
                )
                    .into_response()
            }
            other => {
                let status = match &other {
                    FeedError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                    FeedError::NotFound(_) => StatusCode::NOT_FOUND,
                    FeedError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                    FeedError::RateLimited { .. } | FeedError::Internal(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                let body = Json(json!({
                    "error": other.to_string()
                }));
                (status, body).into_response()
            }
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the feed backend.
pub type Result<T> = std::result::Result<T, FeedError>;
