//! Storefront API Gateway
//!
//! Sits between the browser and the storefront's backend services.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────┐
//!                          │                  GATEWAY                      │
//!     Browser request      │  ┌─────────┐    ┌──────────┐    ┌─────────┐  │
//!     ─────────────────────┼─▶│  http   │───▶│ routing  │───▶│  proxy  │──┼──▶ auth / orders /
//!                          │  │ server  │    │  mounts  │    │ forward │  │    careers / chat
//!     Browser response     │  └─────────┘    └──────────┘    └────┬────┘  │
//!     ◀────────────────────┼────────── headers corrected, body streamed ◀─┼──
//!                          │                                              │
//!                          │  config · observability · lifecycle          │
//!                          └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use storefront_gateway::config::schema::ObservabilityConfig;
use storefront_gateway::config::{load_config, GatewayConfig};
use storefront_gateway::http::HttpServer;
use storefront_gateway::lifecycle::{signals, Shutdown};
use storefront_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "storefront-gateway")]
#[command(version, about = "Reverse proxy for the storefront backend services", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            logging::init_logging(&ObservabilityConfig::default());
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "storefront-gateway starting");

    if cli.check {
        tracing::info!("Configuration is valid");
        return ExitCode::SUCCESS;
    }

    match run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Gateway failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown);

    server.run(listener, server_shutdown).await?;
    Ok(())
}
