//! # Outbound Ports
//!
//! Traits for external dependencies (cluster transport, transaction pool).

use super::inbound::PeerMessageHandler;
use crate::domain::{PeerMessage, SyncError};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared_types::{NodeId, Topic};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Cluster communication - outbound port.
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Send `message` to one peer and wait for its reply.
    async fn request(
        &self,
        node_id: &str,
        topic: Topic,
        message: PeerMessage,
    ) -> Result<PeerMessage, SyncError>;

    /// Publish `message` to every peer subscribed to `topic`.
    async fn broadcast(&self, topic: Topic, message: PeerMessage) -> Result<(), SyncError>;
}

/// Transaction pool - outbound port.
#[async_trait]
pub trait TransactionPoolSync: Send + Sync {
    /// Bring the pool in line with the (possibly rewritten) local chain.
    ///
    /// Returns the number of pooled transactions dropped or replaced.
    async fn resync_all(&self) -> Result<u64, SyncError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// In-process network routing requests straight to registered handlers.
#[derive(Default)]
pub struct MockPeerNetwork {
    handlers: RwLock<HashMap<NodeId, Arc<dyn PeerMessageHandler>>>,
    failing: RwLock<HashSet<NodeId>>,
    broadcasts: Mutex<Vec<(Topic, PeerMessage)>>,
    requests: AtomicUsize,
}

impl MockPeerNetwork {
    /// Create an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Route requests for `node_id` to `handler`.
    pub fn register(&self, node_id: impl Into<NodeId>, handler: Arc<dyn PeerMessageHandler>) {
        self.handlers.write().insert(node_id.into(), handler);
    }

    /// Make every request to `node_id` fail.
    pub fn fail(&self, node_id: impl Into<NodeId>) {
        self.failing.write().insert(node_id.into());
    }

    /// Messages broadcast so far.
    pub fn broadcasts(&self) -> Vec<(Topic, PeerMessage)> {
        self.broadcasts.lock().clone()
    }

    /// Requests issued so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PeerTransport for MockPeerNetwork {
    async fn request(
        &self,
        node_id: &str,
        _topic: Topic,
        message: PeerMessage,
    ) -> Result<PeerMessage, SyncError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.failing.read().contains(node_id) {
            return Err(SyncError::PeerRequest {
                node_id: node_id.to_string(),
                reason: "Mock failure".to_string(),
            });
        }
        let handler = self.handlers.read().get(node_id).cloned();
        match handler {
            Some(handler) => handler.handle(message).await,
            None => Err(SyncError::PeerRequest {
                node_id: node_id.to_string(),
                reason: "unknown peer".to_string(),
            }),
        }
    }

    async fn broadcast(&self, topic: Topic, message: PeerMessage) -> Result<(), SyncError> {
        self.broadcasts.lock().push((topic, message));
        Ok(())
    }
}

/// Transaction pool counting resync requests.
#[derive(Default)]
pub struct MockTransactionPoolSync {
    resyncs: AtomicU64,
}

impl MockTransactionPoolSync {
    /// Number of `resync_all` calls.
    pub fn resyncs(&self) -> u64 {
        self.resyncs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransactionPoolSync for MockTransactionPoolSync {
    async fn resync_all(&self) -> Result<u64, SyncError> {
        self.resyncs.fetch_add(1, Ordering::SeqCst);
        Ok(0)
    }
}
