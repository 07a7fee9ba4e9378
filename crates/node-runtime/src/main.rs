//! # Meridian Node
//!
//! Entry point: load configuration, build a fixed-size worker pool, run a
//! standalone node until Ctrl+C.

use std::sync::Arc;

use anyhow::{Context, Result};
use node_runtime::{NodeConfig, NodeContainer, NodeRuntime};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let config = NodeConfig::from_env().context("Failed to load configuration")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.worker_threads)
        .thread_name("meridian-worker")
        .enable_all()
        .build()
        .context("Failed to build worker pool")?;

    runtime.block_on(run(config))
}

async fn run(config: NodeConfig) -> Result<()> {
    let container = NodeContainer::standalone(config).context("Failed to initialise chain store")?;
    let node = NodeRuntime::new(Arc::new(container));
    node.start().await.context("Failed to start node")?;

    info!("[node] Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    node.shutdown().await;
    Ok(())
}
