//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the comma-separated origin whitelist.
pub const WHITELIST_ENV: &str = "WHITELIST";

/// Environment variable overriding the listener port.
pub const PORT_ENV: &str = "PORT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file plus the process environment.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Same as [`load_config`] with an explicit environment lookup.
pub fn load_config_with<F>(path: Option<&Path>, env: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    let mut errors = Vec::new();
    if let Err(e) = apply_env(&mut config, env) {
        errors.push(e);
    }
    if let Err(mut found) = validate_config(&config) {
        errors.append(&mut found);
    }
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors));
    }

    Ok(config)
}

/// Apply `WHITELIST` and `PORT` overrides.
fn apply_env<F>(config: &mut GatewayConfig, env: F) -> Result<(), ValidationError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = env(WHITELIST_ENV) {
        config.cors.whitelist = split_list(&raw);
    }

    if let Some(port) = env(PORT_ENV) {
        let port: u16 = port
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidPort(port.clone()))?;
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{host}:{port}");
    }

    Ok(())
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_whitelist_from_env() {
        let env = env_of(&[(WHITELIST_ENV, " https://a.example , https://b.example ,,")]);
        let config = load_config_with(None, env).unwrap();
        assert_eq!(
            config.cors.whitelist,
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
    }

    #[test]
    fn test_missing_whitelist_is_fatal() {
        let err = load_config_with(None, env_of(&[])).unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert!(errors.contains(&ValidationError::MissingWhitelist))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_port_override() {
        let env = env_of(&[(WHITELIST_ENV, "https://a.example"), (PORT_ENV, "4000")]);
        let config = load_config_with(None, env).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:4000");
    }

    #[test]
    fn test_invalid_port_reported_with_other_errors() {
        let env = env_of(&[(PORT_ENV, "http")]);
        let err = load_config_with(None, env).unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert!(errors.contains(&ValidationError::InvalidPort("http".into())));
                assert!(errors.contains(&ValidationError::MissingWhitelist));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_from_file_env_wins() {
        let path = std::env::temp_dir().join("storefront_gateway_loader_test.toml");
        std::fs::write(
            &path,
            r#"
[listener]
bind_address = "127.0.0.1:9000"

[cors]
whitelist = ["https://file.example"]

[security]
max_depth = 8
"#,
        )
        .unwrap();

        let config = load_config_with(Some(path.as_path()), env_of(&[])).unwrap();
        assert_eq!(config.cors.whitelist, vec!["https://file.example".to_string()]);
        assert_eq!(config.security.max_depth, 8);
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");

        let env = env_of(&[(WHITELIST_ENV, "https://env.example")]);
        let config = load_config_with(Some(path.as_path()), env).unwrap();
        assert_eq!(config.cors.whitelist, vec!["https://env.example".to_string()]);

        std::fs::remove_file(&path).unwrap_or_default();
    }
}
