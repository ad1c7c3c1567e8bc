//! Version gate stage, the last check before routing.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::request::RequestIdExt;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;

pub async fn version_gate(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let request_id = req.request_id().to_string();
    let (parts, body) = req.into_parts();

    if let Err(e) = state.version.validate(&parts) {
        tracing::warn!(request_id = %request_id, reason = e.reason(), error = %e, "Request rejected by version gate");
        metrics::record_version_rejected(e.reason());
        return ApiError::from(e).into_response();
    }

    next.run(Request::from_parts(parts, body)).await
}
