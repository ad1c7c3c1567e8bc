//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up the request pipeline (request ID, tracing, limits, CORS,
//!   sanitization, version gate)
//! - Bind server to listener
//! - Close shared resources on shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::Request,
    middleware::{from_fn, from_fn_with_state, map_response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::cache::{CacheStore, MemoryCache};
use crate::config::{GatewayConfig, SecurityConfig};
use crate::http::middleware::{
    cors, parse_body, sanitize_body, timeout_as_json, track_metrics, version_gate,
};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::routing;
use crate::security::{EmptyWhitelist, Sanitizer, Whitelist};
use crate::versioning::{self, VersionValidator};

/// Application state injected into handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub whitelist: Arc<Whitelist>,
    pub sanitizer: Arc<Sanitizer>,
    pub version: Arc<dyn VersionValidator>,
    pub cache: Arc<dyn CacheStore>,
    pub security: SecurityConfig,
}

impl AppState {
    /// Build the shared state from a validated configuration.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, EmptyWhitelist> {
        Ok(Self {
            whitelist: Arc::new(Whitelist::new(&config.cors.whitelist)?),
            sanitizer: Arc::new(Sanitizer::new(config.security.max_depth)),
            version: Arc::from(versioning::from_config(&config.version)),
            cache: Arc::new(MemoryCache::new(Duration::from_secs(
                config.cache.default_ttl_secs,
            ))),
            security: config.security.clone(),
        })
    }
}

/// HTTP server for the gateway.
pub struct HttpServer {
    config: GatewayConfig,
    state: AppState,
    routes: Router<AppState>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails when the configuration carries no usable whitelist entry.
    pub fn new(config: GatewayConfig) -> Result<Self, EmptyWhitelist> {
        let state = AppState::from_config(&config)?;
        Ok(Self {
            config,
            state,
            routes: routing::routes(),
        })
    }

    /// Mount additional application routes behind the pipeline.
    pub fn with_routes(mut self, routes: Router<AppState>) -> Self {
        self.routes = self.routes.merge(routes);
        self
    }

    /// Replace the version validator built from configuration.
    pub fn with_version_validator(mut self, validator: Arc<dyn VersionValidator>) -> Self {
        self.state.version = validator;
        self
    }

    /// Replace the cache built from configuration.
    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.state.cache = cache;
        self
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers run outermost-last-added: request ID and tracing first, then
    /// metrics and the timeout, then the pipeline stages in order, then the
    /// routes. The body size limit is enforced by `parse_body` so that a 413
    /// carries the JSON error body.
    #[allow(deprecated)]
    pub fn router(&self) -> Router {
        let state = self.state.clone();

        self.routes
            .clone()
            .fallback(routing::not_found)
            .layer(from_fn_with_state(state.clone(), version_gate))
            .layer(from_fn_with_state(state.clone(), sanitize_body))
            .layer(from_fn_with_state(state.clone(), cors))
            .layer(from_fn_with_state(state.clone(), parse_body))
            .layer(TimeoutLayer::new(Duration::from_secs(self.config.timeouts.request_secs)))
            .layer(map_response(timeout_as_json))
            .layer(from_fn(track_metrics))
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %req.method(),
                    path = %req.uri().path(),
                    request_id = %req.request_id(),
                )
            }))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
            .with_state(state)
    }

    /// Run the server until a shutdown signal arrives.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            origins = self.state.whitelist.len(),
            "HTTP server starting"
        );

        let cache = self.state.cache.clone();
        let app = self.router();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Draining connections");
            })
            .await?;

        cache.close();
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
