//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the shared upstream client (redirects relayed, not followed)
//! - Create the Axum Router with one route set per mount plus chat
//! - Wire up middleware (request ID, tracing, body limit, optional timeout)
//! - Serve until the shutdown signal fires

use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, Request},
    routing::{any, post},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::schema::TimeoutConfig;
use crate::config::validation::validate_config;
use crate::config::{ConfigError, GatewayConfig, Upstreams};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::proxy::{chat_handler, proxy_handler, ChatState, MountState};
use crate::routing::mount_table;

/// Local path of the chat endpoint.
pub const CHAT_PATH: &str = "/api/chat";

/// Errors raised while constructing the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),
}

/// HTTP server for the storefront gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails when a required upstream is missing or invalid.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let upstreams = validate_config(&config).map_err(ConfigError::Validation)?;
        let client = build_upstream_client(&config.timeouts)?;

        let router = Self::build_router(&config, &upstreams, client);

        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, upstreams: &Upstreams, client: reqwest::Client) -> Router {
        let mut router = Router::new();

        for mount in mount_table(upstreams) {
            tracing::debug!(
                mount = mount.name,
                prefix = mount.prefix,
                upstream = %mount.upstream,
                resource = mount.resource,
                kind = ?mount.kind,
                "Registering mount"
            );

            let paths = mount.route_paths();
            let mut mount_router = Router::new();
            for path in &paths {
                mount_router = mount_router.route(path, any(proxy_handler));
            }
            router = router.merge(mount_router.with_state(MountState::new(mount, client.clone())));
        }

        let chat = Router::new()
            .route(CHAT_PATH, post(chat_handler))
            .with_state(ChatState::new(&upstreams.chat, client));
        router = router.merge(chat);

        let mut router = router.layer(DefaultBodyLimit::max(config.limits.max_body_bytes));
        if let Some(secs) = config.timeouts.request_secs {
            router = router.layer(TimeoutLayer::new(Duration::from_secs(secs)));
        }

        router.layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        request_id = %request.headers().request_id(),
                    )
                }))
                .layer(propagate_request_id_layer()),
        )
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The assembled router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Build the client shared by every mount.
///
/// Redirects are handed back to the browser unchanged, no cookie jar is kept
/// and bodies are not decompressed, so the upstream response reaches the
/// client as sent.
pub fn build_upstream_client(timeouts: &TimeoutConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .build()
}
