//! # Fresh Block Listener
//!
//! Handles blocks announced on the fresh-block topic. A block next in line
//! extends the head and is relayed to the node's own peers; a block ahead
//! of the head triggers a catch-up.

use crate::config::SyncConfig;
use crate::domain::{FreshBlockOutcome, PeerMessage, SyncError};
use crate::ports::{ChainSyncApi, PeerTransport};
use shared_types::{Block, ChainStore, ExpiringKeySet, StoreError, Topic};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reacts to freshly forged blocks from peers.
pub struct FreshBlockListener {
    store: Arc<dyn ChainStore>,
    sync: Arc<dyn ChainSyncApi>,
    transport: Arc<dyn PeerTransport>,
    seen_blocks: ExpiringKeySet<String>,
}

impl FreshBlockListener {
    /// Create a listener writing to `store`, catching up through `sync` and
    /// relaying accepted blocks over `transport`.
    pub fn new(
        store: Arc<dyn ChainStore>,
        sync: Arc<dyn ChainSyncApi>,
        transport: Arc<dyn PeerTransport>,
        config: &SyncConfig,
    ) -> Self {
        Self {
            store,
            sync,
            transport,
            seen_blocks: ExpiringKeySet::new(
                config.duplicate_cache_capacity,
                config.duplicate_cache_ttl(),
            ),
        }
    }

    /// Process one announced block.
    #[tracing::instrument(skip(self, block), fields(position = block.position))]
    pub async fn on_fresh_block(&self, block: Block) -> Result<FreshBlockOutcome, SyncError> {
        if !self.seen_blocks.insert_if_absent(block.hash.clone()) {
            return Ok(FreshBlockOutcome::Duplicate);
        }

        let head = self.store.latest_block().await?;
        let next = head.position + 1;

        if block.position == next {
            return match self.store.save(block.clone()).await {
                Ok(()) => {
                    info!("[mc-sync] Fresh block {} extends the chain", next);
                    self.relay(block).await;
                    Ok(FreshBlockOutcome::Accepted)
                }
                Err(StoreError::Validation(e)) => {
                    warn!("[mc-sync] Rejected fresh block {}: {}", next, e);
                    Ok(FreshBlockOutcome::Rejected)
                }
                Err(e) => Err(e.into()),
            };
        }

        if block.position > next {
            info!(
                "[mc-sync] Fresh block {} is ahead of head {}, catching up",
                block.position, head.position
            );
            let applied = self.sync.catch_up().await?;
            return Ok(FreshBlockOutcome::CaughtUp(applied));
        }

        debug!(
            "[mc-sync] Ignoring fresh block {} at or behind head {}",
            block.position, head.position
        );
        Ok(FreshBlockOutcome::Ignored)
    }

    async fn relay(&self, block: Block) {
        let position = block.position;
        if let Err(e) = self
            .transport
            .broadcast(Topic::FreshBlock, PeerMessage::FreshBlock(block))
            .await
        {
            warn!("[mc-sync] Failed to relay fresh block {}: {}", position, e);
        }
    }

    /// Drop expired entries from the seen-block cache.
    pub fn purge_expired(&self) -> usize {
        self.seen_blocks.purge_expired()
    }
}
