//! Trawl Master
//!
//! Master node of the distributed crawl cluster.
//!
//! Architecture:
//! - Configuration: timing contract and paths from environment or defaults
//! - Registries: in-memory worker liveness ledger and running-job map
//! - Barrier: synchronized multi-node phase calls
//! - Master: orchestration engine and the two background loops
//! - API: the cluster-facing RPC surface
//!
//! Workers push heartbeats in; the liveness loop escalates and recovers
//! worker status; job rollout and teardown run as ordered barrier phases;
//! the completion loop retires jobs whose budget is exhausted.

pub mod api;
pub mod barrier;
pub mod config;
pub mod master;
pub mod registry;
pub mod store;
pub mod tracker;

#[cfg(test)]
mod testutil;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::master::Master;
use trawl_client::WorkerClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trawl_master=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Trawl Master...");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;
    info!(
        "Loaded configuration: bind_addr={}, working_dir={:?}",
        config.bind_addr, config.working_dir
    );

    let rpc =
        Arc::new(WorkerClient::new(config.rpc_timeout).context("Failed to build worker client")?);

    let bind_addr = config.bind_addr.clone();
    let master = Arc::new(Master::new(config, rpc).context("Failed to initialize master")?);

    // Start the liveness and completion loops
    master.run();

    // Drain on SIGINT; the RPC shutdown endpoint takes the same path
    {
        let master = Arc::clone(&master);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received interrupt, shutting down");
                master.shutdown().await;
            }
        });
    }

    let token = master.cancel_token();
    let app = api::create_router(Arc::clone(&master));

    info!("Listening on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .context("Failed to bind to address")?;

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(token.cancelled_owned())
        .await
    {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("Trawl Master stopped");
    Ok(())
}
