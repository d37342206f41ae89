//! Edge gateway (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request-id ─▶ trace ─▶ CORS ─▶ dispatch (body limit, timeout)
//!                                                                  │
//!                                                                  ▼
//!                                                        ┌──────────────────┐
//!                                                        │   route table    │
//!                                                        │ (first prefix)   │
//!                                                        └───┬─────┬────┬───┘
//!                                               /api/*       │     │    │  no match
//!                                  ┌─────────────────────────┘     │    └──────────┐
//!                                  ▼                               ▼               ▼
//!                          ┌───────────────┐              ┌──────────────┐   ┌──────────┐
//!                          │ proxy         │              │ local        │   │ 404      │
//!                          │ forwarder     │──▶ upstream  │ handlers     │   │          │
//!                          └───────┬───────┘              └──────┬───────┘   └────┬─────┘
//!                                  │ errors                       │ errors         │
//!                                  └──────────────┬───────────────┴────────────────┘
//!                                                 ▼
//!                                         fallback handler ─▶ Client Response
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use edge_gateway::config::load_config;
use edge_gateway::lifecycle::{signals, Shutdown};
use edge_gateway::observability::{logging, metrics};
use edge_gateway::GatewayServer;

#[derive(Parser)]
#[command(name = "edge-gateway")]
#[command(about = "HTTP gateway with CORS policy and upstream reverse proxy", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_tracing(&config.observability.log_level);
    tracing::info!("edge-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        environment = ?config.environment,
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.origin,
        request_timeout_secs = config.timeouts.request_secs,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Route registration errors are fatal before the listener is bound.
    let bind_address = config.listener.bind_address.clone();
    let server = GatewayServer::new(config)?;

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
