//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, environment overrides)
//!     → validation.rs (semantic checks, resolve upstream base URLs)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to the server and every mount handler
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Missing upstream base URLs are fatal at startup, never a per-request check

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::GatewayConfig;
pub use schema::ListenerConfig;
pub use schema::UpstreamsConfig;
pub use validation::{UpstreamBase, Upstreams, ValidationError};
