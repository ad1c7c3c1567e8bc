//! JSON body for requests cut off by the timeout layer.

use axum::{
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};

use crate::http::response::ApiError;

/// Replace the bare 408 produced by `TimeoutLayer` with an [`ApiError`] body.
///
/// A 408 that already carries a content type came from a handler and is kept.
pub async fn timeout_as_json(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT
        && !response.headers().contains_key(CONTENT_TYPE)
    {
        tracing::warn!("Request timed out");
        return ApiError::Timeout.into_response();
    }
    response
}
