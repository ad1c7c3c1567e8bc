//! Storefront API gateway.
//!
//! An Axum service that runs every request through a fixed pipeline before
//! it reaches the storefront routes.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────────▶ request id ─▶ trace ─▶ metrics ─▶ timeout (408)
//!                                                              │
//!                 ┌────────────────────────────────────────────┘
//!                 ▼
//!           ┌───────────┐   ┌──────────┐   ┌─────────────┐   ┌─────────────┐
//!           │ parse_body│──▶│   cors   │──▶│sanitize_body│──▶│version_gate │──▶ routes
//!           └─────┬─────┘   └────┬─────┘   └──────┬──────┘   └──────┬──────┘
//!                 │              │                │                 │
//!            400 bad JSON   403 blocked     400 too deep       400 / 426
//!            413 too large  204 preflight
//! ```
//!
//! # Startup
//! - `WHITELIST` (comma-separated origins) is mandatory; without it the
//!   process exits before binding a port
//! - `--config <PATH>` optionally points at a TOML file

use std::path::PathBuf;

use clap::Parser;

use storefront_gateway::config::{load_config, ObservabilityConfig};
use storefront_gateway::lifecycle;
use storefront_gateway::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "storefront-gateway")]
#[command(about = "Sanitizing, CORS-enforcing front door for the storefront API", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_logging(&ObservabilityConfig::default());
            tracing::error!(error = %e, "Invalid configuration, refusing to start");
            std::process::exit(1);
        }
    };

    init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        origins = config.cors.whitelist.len(),
        request_timeout_secs = config.timeouts.request_secs,
        version_gate = config.version.enabled,
        "Configuration loaded"
    );

    lifecycle::start(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
