//! Client version compatibility gate.
//!
//! # Responsibilities
//! - Read the client's declared version from a request header
//! - Reject clients older than the configured minimum
//!
//! # Design Decisions
//! - The pipeline only sees the `VersionValidator` trait; comparison rules
//!   live behind it and can be swapped without touching the middleware
//! - Validation runs on request parts only, never on the body

use axum::http::{request::Parts, HeaderName, StatusCode};
use semver::Version;
use thiserror::Error;

use crate::config::VersionConfig;

/// Reasons a request fails the version gate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("Missing client version header `{header}`.")]
    Missing { header: String },

    #[error("Client version `{declared}` is not a valid version.")]
    Invalid { declared: String },

    #[error("Client version {declared} is no longer supported; minimum is {minimum}.")]
    Unsupported { declared: Version, minimum: Version },
}

impl VersionError {
    pub fn status(&self) -> StatusCode {
        match self {
            VersionError::Missing { .. } | VersionError::Invalid { .. } => StatusCode::BAD_REQUEST,
            VersionError::Unsupported { .. } => StatusCode::UPGRADE_REQUIRED,
        }
    }

    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            VersionError::Missing { .. } => "missing",
            VersionError::Invalid { .. } => "invalid",
            VersionError::Unsupported { .. } => "unsupported",
        }
    }
}

/// Decides whether a request's declared client version is acceptable.
pub trait VersionValidator: Send + Sync {
    fn validate(&self, parts: &Parts) -> Result<(), VersionError>;
}

/// Validator that accepts every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl VersionValidator for AcceptAll {
    fn validate(&self, _parts: &Parts) -> Result<(), VersionError> {
        Ok(())
    }
}

/// Requires a semver header at or above a minimum version.
#[derive(Debug, Clone)]
pub struct MinimumVersion {
    header: HeaderName,
    minimum: Version,
    required: bool,
}

impl MinimumVersion {
    pub fn new(header: HeaderName, minimum: Version, required: bool) -> Self {
        Self {
            header,
            minimum,
            required,
        }
    }
}

impl VersionValidator for MinimumVersion {
    fn validate(&self, parts: &Parts) -> Result<(), VersionError> {
        let raw = match parts.headers.get(&self.header) {
            Some(value) => value,
            None if self.required => {
                return Err(VersionError::Missing {
                    header: self.header.to_string(),
                })
            }
            None => return Ok(()),
        };

        let declared = raw
            .to_str()
            .ok()
            .map(|s| s.trim().trim_start_matches('v'))
            .and_then(|s| Version::parse(s).ok())
            .ok_or_else(|| VersionError::Invalid {
                declared: String::from_utf8_lossy(raw.as_bytes()).into_owned(),
            })?;

        if declared < self.minimum {
            return Err(VersionError::Unsupported {
                declared,
                minimum: self.minimum.clone(),
            });
        }
        Ok(())
    }
}

/// Build the validator described by the configuration.
///
/// Configuration is validated at load time; a header or version that still
/// fails to parse here disables the gate with an error log.
pub fn from_config(config: &VersionConfig) -> Box<dyn VersionValidator> {
    if !config.enabled {
        return Box::new(AcceptAll);
    }

    let header = HeaderName::from_bytes(config.header.as_bytes());
    let minimum = Version::parse(&config.minimum);
    match (header, minimum) {
        (Ok(header), Ok(minimum)) => {
            tracing::info!(header = %header, minimum = %minimum, required = config.required, "Version gate enabled");
            Box::new(MinimumVersion::new(header, minimum, config.required))
        }
        _ => {
            tracing::error!(header = %config.header, minimum = %config.minimum, "Invalid version gate settings, gate disabled");
            Box::new(AcceptAll)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(version: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/cart");
        if let Some(v) = version {
            builder = builder.header("x-app-version", v);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn gate(required: bool) -> MinimumVersion {
        MinimumVersion::new(
            HeaderName::from_static("x-app-version"),
            Version::new(2, 1, 0),
            required,
        )
    }

    #[test]
    fn test_accepts_equal_and_newer() {
        assert!(gate(true).validate(&parts_with(Some("2.1.0"))).is_ok());
        assert!(gate(true).validate(&parts_with(Some("3.0.0"))).is_ok());
        assert!(gate(true).validate(&parts_with(Some("v2.4.1"))).is_ok());
    }

    #[test]
    fn test_rejects_older() {
        let err = gate(true).validate(&parts_with(Some("2.0.9"))).unwrap_err();
        assert_eq!(err.status(), StatusCode::UPGRADE_REQUIRED);
        assert_eq!(err.reason(), "unsupported");
    }

    #[test]
    fn test_invalid_version() {
        let err = gate(false).validate(&parts_with(Some("latest"))).unwrap_err();
        assert_eq!(
            err,
            VersionError::Invalid {
                declared: "latest".into()
            }
        );
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_missing_header() {
        assert!(gate(false).validate(&parts_with(None)).is_ok());
        let err = gate(true).validate(&parts_with(None)).unwrap_err();
        assert_eq!(err.reason(), "missing");
    }

    #[test]
    fn test_from_config_disabled_accepts_all() {
        let validator = from_config(&VersionConfig::default());
        assert!(validator.validate(&parts_with(Some("garbage"))).is_ok());
    }

    #[test]
    fn test_from_config_enabled() {
        let config = VersionConfig {
            enabled: true,
            minimum: "1.5.0".into(),
            ..VersionConfig::default()
        };
        let validator = from_config(&config);
        assert!(validator.validate(&parts_with(Some("1.4.0"))).is_err());
        assert!(validator.validate(&parts_with(Some("1.5.0"))).is_ok());
    }
}
