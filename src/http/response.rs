//! Error responses.
//!
//! # Responsibilities
//! - Map every per-request failure to a status code and JSON body
//! - Keep internal details in the logs, never in the response
//!
//! # Design Decisions
//! - Bodies are always `{"error": "..."}`, plus `origin` for CORS rejections
//! - Errors are caught at the pipeline boundary; nothing unwinds into the server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::security::SanitizeError;
use crate::versioning::VersionError;

/// Per-request failures produced by the pipeline.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("CORS policy does not allow access from this origin.")]
    CorsViolation { origin: String },

    #[error("Malformed JSON body.")]
    MalformedJson,

    #[error("Request body exceeds the allowed size.")]
    PayloadTooLarge,

    #[error("Request timed out.")]
    Timeout,

    #[error("Request body is nested too deeply.")]
    MalformedInput(#[source] SanitizeError),

    #[error(transparent)]
    Version(#[from] VersionError),

    #[error("Internal server error.")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::CorsViolation { .. } => StatusCode::FORBIDDEN,
            ApiError::MalformedJson | ApiError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::Version(e) => e.status(),
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        let body = match self {
            ApiError::CorsViolation { origin } => json!({ "error": message, "origin": origin }),
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "Internal error while handling request");
                json!({ "error": message })
            }
            _ => json!({ "error": message }),
        };
        (status, Json(body)).into_response()
    }
}
