//! Storefront API gateway library.
//!
//! Relays the storefront's `/api/*` calls to the auth, orders, careers and
//! chat services.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod routing;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
