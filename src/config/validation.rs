//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits > 0)
//! - Refuse to start without an origin whitelist
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no CORS whitelist configured (set WHITELIST)")]
    MissingWhitelist,

    #[error("version.minimum `{0}` is not a valid semantic version")]
    InvalidMinimumVersion(String),

    #[error("security.max_depth must be greater than zero")]
    ZeroMaxDepth,

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("PORT `{0}` is not a valid port number")]
    InvalidPort(String),

    #[error("version.header `{0}` is not a valid header name")]
    InvalidVersionHeader(String),
}

/// Check a loaded configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.cors.whitelist.iter().all(|o| o.trim().is_empty()) {
        errors.push(ValidationError::MissingWhitelist);
    }

    if config.version.enabled {
        if semver::Version::parse(&config.version.minimum).is_err() {
            errors.push(ValidationError::InvalidMinimumVersion(
                config.version.minimum.clone(),
            ));
        }
        if axum::http::HeaderName::from_bytes(config.version.header.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidVersionHeader(
                config.version.header.clone(),
            ));
        }
    }

    if config.security.max_depth == 0 {
        errors.push(ValidationError::ZeroMaxDepth);
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
