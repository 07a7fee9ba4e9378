//! # Meridian Node Runtime
//!
//! Orchestrates one node: startup reconciliation with the network, then a
//! timer-driven block-production loop.
//!
//! ## Modular Structure
//!
//! - `container/` - Configuration and subsystem wiring
//! - `adapters/` - Port implementations (mempool, loopback cluster)
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults, then `MC_*` environment variables)
//! 2. Wire subsystems (`NodeContainer`)
//! 3. Reconcile the local chain with the network majority
//! 4. Resync the transaction pool against the reconciled chain
//! 5. Start the block-production loop
//!
//! ## Production Cycle
//!
//! ```text
//! pending txs ──→ ConsensusSelector ──→ ChainStore::save ──→ broadcast FreshBlock
//!      ↑                                                            │
//!      └──────────────── remove included txs ←──────────────────────┘
//! ```
//!
//! Any failure in a cycle is logged and the cycle skipped; the next tick
//! starts over from the current head.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod container;

use std::sync::Arc;

use mc_chain_sync::{PeerMessage, ReconcileReport, SyncError};
use mc_consensus::ConsensusError;
use parking_lot::Mutex;
use shared_types::{Block, ChainStore, StoreError, Topic};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::adapters::TransactionSource;
pub use crate::container::{ConfigError, NodeConfig, NodeContainer};

/// Runtime errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Chain sync failed.
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// Sealing failed.
    #[error("Consensus error: {0}")]
    Consensus(#[from] ConsensusError),

    /// The chain store rejected or failed an operation.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration is unusable.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// The node runtime driving one `NodeContainer`.
pub struct NodeRuntime {
    /// Subsystem container.
    container: Arc<NodeContainer>,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
    /// Shutdown signal receiver.
    shutdown_rx: watch::Receiver<bool>,
    /// Running production loop.
    production: Mutex<Option<JoinHandle<()>>>,
}

impl NodeRuntime {
    /// Create a runtime for `container`.
    pub fn new(container: Arc<NodeContainer>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container,
            shutdown_tx,
            shutdown_rx,
            production: Mutex::new(None),
        }
    }

    /// Reconcile with the network, then start the production loop.
    ///
    /// A chain that shares no history with the network majority is reported
    /// as needing a full resync and the loop is not started.
    pub async fn start(&self) -> Result<ReconcileReport, RuntimeError> {
        info!("===========================================");
        info!("  Meridian Node Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("  Node: {}", self.container.config.node_id);
        info!("===========================================");

        let report = match self.container.sync.reconcile_on_startup().await {
            Ok(report) => report,
            Err(e) if e.requires_full_resync() => {
                error!("[node] Local chain diverges from the network: full resync required");
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };
        info!(
            "[node] Reconciled: fork {:?}, {} blocks applied, {} pooled transactions dropped",
            report.fork_position, report.blocks_applied, report.transactions_resynced
        );

        let container = Arc::clone(&self.container);
        let shutdown = self.shutdown_rx.clone();
        let handle = tokio::spawn(run_production_loop(container, shutdown));
        *self.production.lock() = Some(handle);

        info!(
            "[node] Block production every {:?}",
            self.container.config.production_interval()
        );
        Ok(report)
    }

    /// Run one production cycle now.
    ///
    /// Returns `None` when there was nothing to seal.
    pub async fn produce_block(&self) -> Result<Option<Block>, RuntimeError> {
        produce_block(&self.container).await
    }

    /// Stop the production loop and any nonce search in progress.
    pub async fn shutdown(&self) {
        info!("[node] Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("[node] Failed to send shutdown signal: {}", e);
        }
        self.container.consensus.stop_finding_consensus();

        let handle = self.production.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("[node] Production loop ended abnormally: {}", e);
            }
        }

        info!("[node] Shutdown complete");
    }

    /// Subsystem container.
    pub fn container(&self) -> Arc<NodeContainer> {
        Arc::clone(&self.container)
    }
}

async fn run_production_loop(container: Arc<NodeContainer>, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(container.config.production_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                purge_duplicate_caches(&container);
                // A shutdown mid-cycle abandons the cycle.
                tokio::select! {
                    result = produce_block(&container) => match result {
                        Ok(Some(block)) => info!(
                            "[node] Forged block {} with {} transactions",
                            block.position,
                            block.transactions.len()
                        ),
                        Ok(None) => debug!("[node] Nothing pending, skipping cycle"),
                        Err(e) => warn!("[node] Production cycle skipped: {}", e),
                    },
                    _ = shutdown.changed() => {
                        info!("[node] Block production stopped mid-cycle");
                        break;
                    }
                }
            }
            _ = shutdown.changed() => {
                info!("[node] Block production stopped");
                break;
            }
        }
    }
}

fn purge_duplicate_caches(container: &NodeContainer) {
    let purged = container.listener.purge_expired() + container.responder.purge_expired();
    if purged > 0 {
        debug!("[node] Purged {} expired duplicate-cache entries", purged);
    }
}

async fn produce_block(container: &NodeContainer) -> Result<Option<Block>, RuntimeError> {
    let transactions = container
        .mempool
        .pending(container.config.max_block_transactions)
        .await;
    if transactions.is_empty() {
        return Ok(None);
    }

    let block = container.consensus.reach_consensus(transactions).await?;
    container.store.save(block.clone()).await?;

    if let Err(e) = container
        .transport
        .broadcast(Topic::FreshBlock, PeerMessage::FreshBlock(block.clone()))
        .await
    {
        warn!("[node] Failed to broadcast block {}: {}", block.position, e);
    }

    let included: Vec<String> = block.transactions.iter().map(|t| t.hash.clone()).collect();
    container.mempool.remove_included(&included).await;
    Ok(Some(block))
}
