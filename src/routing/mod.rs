//! Routing subsystem.
//!
//! The gateway owns only the service-level routes; application routes are
//! mounted with `HttpServer::with_routes` and sit behind the same pipeline.
//! Anything unmatched falls through to a plain-text 404.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub cache: &'static str,
}

/// Service-level routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    let cache = match state.cache.get("health:probe") {
        Ok(_) => "up",
        Err(_) => "closed",
    };

    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        cache,
    })
}

/// Fallback for unmatched routes.
pub async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "API NOT FOUND")
}
