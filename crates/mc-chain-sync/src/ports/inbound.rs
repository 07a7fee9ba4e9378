//! # Inbound Ports
//!
//! API exposed to the node runtime and to the transport's dispatch loop.

use crate::domain::{PeerMessage, ReconcileReport, ScanOutcome, SyncError};
use async_trait::async_trait;
use shared_types::BlockInfoResult;

/// Chain reconciliation API.
#[async_trait]
pub trait ChainSyncApi: Send + Sync {
    /// Scan, apply the missing range, then resync the transaction pool.
    async fn reconcile_on_startup(&self) -> Result<ReconcileReport, SyncError>;

    /// Fetch forward from the local head until peers report nothing new.
    async fn catch_up(&self) -> Result<u64, SyncError>;

    /// Locate the fork point walking back from `from_position`.
    async fn scan_for_missing(&self, from_position: u64) -> Result<ScanOutcome, SyncError>;

    /// Fetch a forward batch, trusted only if its first info matches local
    /// storage.
    async fn fetch_confident(
        &self,
        from_position: u64,
        batch_size: u32,
    ) -> Result<Option<BlockInfoResult>, SyncError>;

    /// Download and store the blocks described by `result`.
    async fn apply_missing(&self, result: &BlockInfoResult) -> Result<u64, SyncError>;
}

/// Serves a request arriving from a peer.
#[async_trait]
pub trait PeerMessageHandler: Send + Sync {
    /// Produce the reply to `message`.
    async fn handle(&self, message: PeerMessage) -> Result<PeerMessage, SyncError>;
}
