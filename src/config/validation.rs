//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Resolve every required upstream base URL
//! - Validate value ranges (limits > 0, bind address parses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<Upstreams, Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::loader::{AUTH_URL_ENV, CAREERS_URL_ENV, CHAT_URL_ENV, ORDERS_URL_ENV};
use crate::config::schema::GatewayConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required upstream base URL was not provided.
    #[error("upstream `{name}` is not configured (set {env})")]
    MissingUpstream {
        name: &'static str,
        env: &'static str,
    },

    /// An upstream base URL is present but unusable.
    #[error("upstream `{name}` has invalid base URL {value:?}: {reason}")]
    InvalidUpstream {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// The listener bind address does not parse.
    #[error("invalid bind address {0:?}")]
    InvalidBindAddress(String),

    /// A numeric limit that must be positive is zero.
    #[error("`{0}` must be greater than zero")]
    ZeroValue(&'static str),
}

/// Validated upstream base URL with any trailing `/` removed, so that
/// target URLs are built by plain concatenation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamBase(String);

impl UpstreamBase {
    /// Parse and normalise a base URL.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err("empty value".to_string());
        }

        let url = Url::parse(trimmed).map_err(|e| e.to_string())?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(format!("unsupported scheme `{}`", other)),
        }
        if url.host_str().is_none() {
            return Err("missing host".to_string());
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err("base URL must not carry a query or fragment".to_string());
        }

        Ok(Self(trimmed.trim_end_matches('/').to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UpstreamBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The full set of resolved upstreams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upstreams {
    pub auth: UpstreamBase,
    pub orders: UpstreamBase,
    pub careers: UpstreamBase,
    pub chat: UpstreamBase,
}

/// Validate a configuration and resolve its upstreams.
pub fn validate_config(config: &GatewayConfig) -> Result<Upstreams, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let upstreams = &config.upstreams;
    let auth = resolve("auth", AUTH_URL_ENV, upstreams.auth.as_deref(), &mut errors);
    let orders = resolve("orders", ORDERS_URL_ENV, upstreams.orders.as_deref(), &mut errors);
    let careers = resolve("careers", CAREERS_URL_ENV, upstreams.careers.as_deref(), &mut errors);
    let chat = resolve("chat", CHAT_URL_ENV, upstreams.chat.as_deref(), &mut errors);

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroValue("limits.max_body_bytes"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.connect_secs"));
    }
    if config.timeouts.request_secs == Some(0) {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }

    match (auth, orders, careers, chat) {
        (Some(auth), Some(orders), Some(careers), Some(chat)) if errors.is_empty() => Ok(Upstreams {
            auth,
            orders,
            careers,
            chat,
        }),
        _ => Err(errors),
    }
}

fn resolve(
    name: &'static str,
    env: &'static str,
    raw: Option<&str>,
    errors: &mut Vec<ValidationError>,
) -> Option<UpstreamBase> {
    let Some(raw) = raw.filter(|v| !v.trim().is_empty()) else {
        errors.push(ValidationError::MissingUpstream { name, env });
        return None;
    };

    match UpstreamBase::parse(raw) {
        Ok(base) => Some(base),
        Err(reason) => {
            errors.push(ValidationError::InvalidUpstream {
                name,
                value: raw.to_string(),
                reason,
            });
            None
        }
    }
}
