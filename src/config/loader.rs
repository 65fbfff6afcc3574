//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the auth service base URL.
pub const AUTH_URL_ENV: &str = "AUTH_SERVICE_URL";
/// Environment variable holding the orders service base URL.
pub const ORDERS_URL_ENV: &str = "ORDERS_SERVICE_URL";
/// Environment variable holding the careers service base URL.
pub const CAREERS_URL_ENV: &str = "CAREERS_SERVICE_URL";
/// Environment variable holding the chat service base URL.
pub const CHAT_URL_ENV: &str = "CHAT_SERVICE_URL";
/// Environment variable overriding the listener bind address.
pub const BIND_ADDRESS_ENV: &str = "GATEWAY_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply process environment
/// overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment values onto a configuration.
///
/// Empty values are ignored so that an exported-but-blank variable does not
/// mask a value from the file.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get(AUTH_URL_ENV) {
        config.upstreams.auth = Some(v);
    }
    if let Some(v) = get(ORDERS_URL_ENV) {
        config.upstreams.orders = Some(v);
    }
    if let Some(v) = get(CAREERS_URL_ENV) {
        config.upstreams.careers = Some(v);
    }
    if let Some(v) = get(CHAT_URL_ENV) {
        config.upstreams.chat = Some(v);
    }
    if let Some(v) = get(BIND_ADDRESS_ENV) {
        config.listener.bind_address = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn env_overrides_file_values() {
        let mut config = GatewayConfig::default();
        config.upstreams.orders = Some("http://from-file".into());

        let env: HashMap<&str, &str> = HashMap::from([
            (ORDERS_URL_ENV, "https://orders.example"),
            (CHAT_URL_ENV, ""),
            (BIND_ADDRESS_ENV, "127.0.0.1:4000"),
        ]);
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.upstreams.orders.as_deref(), Some("https://orders.example"));
        assert!(config.upstreams.chat.is_none());
        assert_eq!(config.listener.bind_address, "127.0.0.1:4000");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_config(Some(Path::new("/nonexistent/gateway.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn validation_error_lists_all_problems() {
        let err = ConfigError::Validation(vec![
            ValidationError::MissingUpstream {
                name: "orders",
                env: ORDERS_URL_ENV,
            },
            ValidationError::ZeroValue("limits.max_body_bytes"),
        ]);
        let message = err.to_string();
        assert!(message.contains("ORDERS_SERVICE_URL"));
        assert!(message.contains("limits.max_body_bytes"));
    }
}
