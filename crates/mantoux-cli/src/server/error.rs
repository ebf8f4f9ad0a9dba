//! API error types and the response envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mantoux::MantouxError;
use serde_json::json;

/// API error type. Every library error is translated here, once, into
/// the `{success: false, error: {kind, message}}` envelope; nothing
/// crashes the process.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client (unparseable scope, unknown field).
    BadRequest(String),
    /// Internal server error.
    Internal(String),
    /// Error from the mantoux library.
    Mantoux(MantouxError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg),
            ApiError::Mantoux(e) => (status_for(&e), e.kind(), e.to_string()),
        };

        (
            status,
            Json(json!({
                "success": false,
                "error": { "kind": kind, "message": message },
            })),
        )
            .into_response()
    }
}

fn status_for(error: &MantouxError) -> StatusCode {
    match error {
        MantouxError::UnsupportedAnalysis(_) => StatusCode::NOT_FOUND,
        MantouxError::InsufficientData { .. }
        | MantouxError::DivisionByZero(_)
        | MantouxError::ShapeMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        MantouxError::Io { .. } | MantouxError::DataLoad(_) | MantouxError::Csv(_) => {
            StatusCode::BAD_GATEWAY
        }
        MantouxError::Json(_) | MantouxError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<MantouxError> for ApiError {
    fn from(err: MantouxError) -> Self {
        ApiError::Mantoux(err)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
            ApiError::Mantoux(e) => write!(f, "Mantoux error: {}", e),
        }
    }
}

impl std::error::Error for ApiError {}
