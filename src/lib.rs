//! Storefront API gateway library.
//!
//! Request sanitization and CORS enforcement in front of the storefront API.

pub mod cache;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;
pub mod versioning;

pub use config::schema::GatewayConfig;
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
