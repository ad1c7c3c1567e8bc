//! Startup orchestration.
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Shared state is built before the socket is bound, so a bad whitelist
//!   never opens a port
//! - Listener starts last (traffic only when ready)

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;
use crate::security::EmptyWhitelist;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Whitelist(#[from] EmptyWhitelist),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Start the gateway and serve until SIGINT/SIGTERM.
pub async fn start(config: GatewayConfig) -> Result<(), StartupError> {
    let server = HttpServer::new(config.clone())?;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(signals::trigger_on_signal(shutdown));

    server
        .run(listener, server_shutdown)
        .await
        .map_err(StartupError::Serve)
}
