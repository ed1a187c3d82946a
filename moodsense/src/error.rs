//! API error types.
//!
//! Per-request failures are split into caller-input problems (400) and
//! server-side pipeline failures (500). Both produce a JSON body with a
//! single flat `error` string; callers distinguish success from failure by
//! which of `mood` / `error` is present.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::audio::DecodeError;
use crate::model::ClassifierError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Caller-supplied input could not be used (400)
    #[error("{0}")]
    BadRequest(String),

    /// Pipeline failure on the server side (500)
    #[error("{0}")]
    Internal(String),
}

impl From<DecodeError> for ApiError {
    fn from(err: DecodeError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<ClassifierError> for ApiError {
    fn from(err: ClassifierError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
