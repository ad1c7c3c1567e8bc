//! JSON body parsing and sanitization stages.
//!
//! `parse_body` runs first in the pipeline and only parses; `sanitize_body`
//! runs after the CORS stage and rewrites the body that handlers will see.

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{
        header::{CONTENT_LENGTH, CONTENT_TYPE, TRANSFER_ENCODING},
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::{LengthLimitError, Limited};
use serde_json::Value;

use crate::http::request::RequestIdExt;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::strip_operator_keys;

/// JSON body parsed by [`parse_body`], awaiting sanitization.
#[derive(Debug, Clone)]
pub struct ParsedBody(pub Value);

/// True when the request declares a JSON media type.
pub fn is_json(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case("application/json")
        || essence.to_ascii_lowercase().ends_with("+json")
}

/// Declared `Content-Length`, when present and well-formed.
pub fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Enforce the body size limit and buffer + parse JSON request bodies.
///
/// Declared oversize bodies are refused up front; bodies without a length are
/// cut off while reading. Non-JSON bodies stream on with the same limit.
pub async fn parse_body(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let limit = state.security.max_body_size;
    let request_id = req.request_id().to_string();

    if let Some(declared) = declared_length(req.headers()) {
        if declared > limit as u64 {
            tracing::warn!(request_id = %request_id, declared, limit, "Request body too large");
            return ApiError::PayloadTooLarge.into_response();
        }
    }

    let (mut parts, body) = req.into_parts();

    if !is_json(&parts.headers) {
        let body = Body::new(Limited::new(body, limit));
        return next.run(Request::from_parts(parts, body)).await;
    }

    let bytes = match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => bytes,
        Err(e) if exceeds_limit(&e) => {
            tracing::warn!(request_id = %request_id, limit, "Request body too large");
            return ApiError::PayloadTooLarge.into_response();
        }
        Err(e) => {
            tracing::debug!(request_id = %request_id, error = %e, "Failed to read request body");
            return ApiError::MalformedJson.into_response();
        }
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return next.run(Request::from_parts(parts, Body::from(bytes))).await;
    }

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(value) => {
            parts.extensions.insert(ParsedBody(value));
        }
        Err(e) => {
            tracing::debug!(request_id = %request_id, error = %e, "Rejected malformed JSON body");
            return ApiError::MalformedJson.into_response();
        }
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

/// Sanitize the parsed body and replace the request body with the result.
pub async fn sanitize_body(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let request_id = req.request_id().to_string();
    let (mut parts, body) = req.into_parts();

    let Some(ParsedBody(value)) = parts.extensions.remove::<ParsedBody>() else {
        return next.run(Request::from_parts(parts, body)).await;
    };

    let mut clean = match state.sanitizer.sanitize(value) {
        Ok(clean) => clean,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Rejected request body");
            return ApiError::MalformedInput(e).into_response();
        }
    };

    if state.security.strip_operator_keys {
        let removed = strip_operator_keys(&mut clean);
        if removed > 0 {
            tracing::warn!(request_id = %request_id, removed, "Stripped operator keys from request body");
            metrics::record_operator_keys_stripped(removed);
        }
    }

    let bytes = match serde_json::to_vec(&clean) {
        Ok(bytes) => Bytes::from(bytes),
        Err(e) => return ApiError::Internal(e.to_string()).into_response(),
    };

    parts.headers.remove(TRANSFER_ENCODING);
    parts.headers.insert(CONTENT_LENGTH, HeaderValue::from(bytes.len()));
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

fn exceeds_limit(err: &axum::Error) -> bool {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}
