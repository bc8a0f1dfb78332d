//! RPC Gateway (v1)
//!
//! Blockchain connectivity gateway for a prediction-market platform.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌────────────────────────────────────────────────┐
//!                      │                 RPC GATEWAY                    │
//!                      │                                                │
//!  POST /api/rpc-proxy │  ┌─────────┐     ┌──────────────────────────┐  │
//!  ────────────────────┼─▶│  http   │────▶│ rpc_proxy: first-success │──┼──▶ RPC pool
//!                      │  │ server  │     │ relay over endpoint list │  │    (ordered)
//!  GET/POST /api/*     │  │         │     ├──────────────────────────┤  │
//!  ────────────────────┼─▶│         │────▶│ backend_proxy: route     │──┼──▶ REST backend
//!                      │  └─────────┘     │ table + 429 backoff      │  │
//!                      │       │          └──────────────────────────┘  │
//!                      │       ▼                                        │
//!                      │  ┌──────────────────────────────────────────┐  │
//!                      │  │ chain: ConnectionManager (current index, │  │
//!                      │  │ healthy flag) + periodic HealthMonitor   │  │
//!                      │  └──────────────────────────────────────────┘  │
//!                      │                                                │
//!                      │  config · observability · lifecycle           │
//!                      └────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use rpc_gateway::config::loader::load_config;
use rpc_gateway::config::GatewayConfig;
use rpc_gateway::http::HttpServer;
use rpc_gateway::lifecycle::Shutdown;
use rpc_gateway::observability::{logging, metrics};
use rpc_gateway::ConnectionManager;

#[derive(Debug, Parser)]
#[command(name = "rpc-gateway", about = "RPC failover gateway")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "gateway.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = if cli.config.exists() {
        load_config(&cli.config)?
    } else {
        GatewayConfig::default()
    };

    logging::init(&config.observability.log_level);
    tracing::info!("rpc-gateway v0.1.0 starting");

    if !cli.config.exists() {
        tracing::warn!(path = %cli.config.display(), "Config file not found, using defaults");
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        endpoints = config.chain.rpc_urls.len(),
        chain_id = config.chain.chain_id,
        health_interval_secs = config.health_check.interval_secs,
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

    let manager = Arc::new(ConnectionManager::new(
        &config.chain,
        config.retries.clone(),
        std::time::Duration::from_secs(config.health_check.probe_timeout_secs),
    )?);

    // Verify connectivity and chain identity; degrade gracefully on failure.
    match manager.verify_chain_id().await {
        Ok(()) => tracing::info!(chain_id = config.chain.chain_id, "Chain identity verified"),
        Err(e) => tracing::warn!(error = %e, "Chain verification failed at startup"),
    }

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config, manager)?;
    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
