//! Origin guard, CORS response headers and preflight handling.
//!
//! Blocked origins are rejected before any CORS header is composed, so a 403
//! never echoes the rejected origin back in `Access-Control-Allow-Origin`.

use axum::{
    extract::{Request, State},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
            ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN, VARY,
        },
        HeaderMap, HeaderValue, Method, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::request::RequestIdExt;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::security::CorsDecision;

pub const ALLOWED_METHODS: &str = "GET,HEAD,PUT,PATCH,POST,DELETE,OPTIONS";
pub const ALLOWED_HEADERS: &str = "Origin, X-Requested-With, Content-Type, Accept, Authorization";

/// Enforce the origin whitelist, answer preflights, decorate responses.
pub async fn cors(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let origin = req
        .headers()
        .get(ORIGIN)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

    if state.whitelist.decide(origin.as_deref()) == CorsDecision::Blocked {
        tracing::debug!(
            request_id = %req.request_id(),
            method = %req.method(),
            path = %req.uri().path(),
            "Request rejected by CORS policy"
        );
        return ApiError::CorsViolation {
            origin: origin.unwrap_or_default(),
        }
        .into_response();
    }

    let mut response = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };

    apply_cors_headers(response.headers_mut(), origin.as_deref());
    response
}

/// Set the CORS response headers for an allowed request.
pub fn apply_cors_headers(headers: &mut HeaderMap, origin: Option<&str>) {
    let allow_origin = origin
        .and_then(|o| HeaderValue::from_str(o).ok())
        .unwrap_or_else(|| HeaderValue::from_static("*"));

    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
    headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOWED_METHODS));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOWED_HEADERS));
    headers.append(VARY, HeaderValue::from_static("Origin"));
}
