//! # Sync Responder
//!
//! Answers peers' batch requests from local storage. A request id seen
//! within the duplicate-cache TTL is refused.

use crate::config::SyncConfig;
use crate::domain::{PeerMessage, SyncError};
use crate::ports::PeerMessageHandler;
use async_trait::async_trait;
use shared_types::{ChainStore, ExpiringKeySet, NodeId, SyncBatchRequest, SyncResponse, Topic};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Serves `BlockInfo` and `Block` batches to peers.
pub struct SyncResponder {
    node_id: NodeId,
    store: Arc<dyn ChainStore>,
    seen_requests: ExpiringKeySet<Uuid>,
    max_batch_size: u32,
}

impl SyncResponder {
    /// Create a responder for the chain in `store`.
    pub fn new(node_id: impl Into<NodeId>, store: Arc<dyn ChainStore>, config: &SyncConfig) -> Self {
        Self {
            node_id: node_id.into(),
            store,
            seen_requests: ExpiringKeySet::new(
                config.duplicate_cache_capacity,
                config.duplicate_cache_ttl(),
            ),
            max_batch_size: config.batch_size.max(config.scan_window_size as u32),
        }
    }

    /// Drop expired entries from the seen-request cache.
    pub fn purge_expired(&self) -> usize {
        self.seen_requests.purge_expired()
    }

    fn admit(&self, request: &SyncBatchRequest) -> Result<u64, SyncError> {
        if !self.seen_requests.insert_if_absent(request.request_id) {
            debug!(
                "[mc-sync] Ignoring duplicate request {} on {}",
                request.request_id, request.topic
            );
            return Err(SyncError::DuplicateRequest(request.request_id));
        }
        // Scanning asks for its window plus a forward batch.
        let cap = u64::from(self.max_batch_size) * 2;
        Ok(u64::from(request.batch_size).min(cap))
    }

    async fn block_infos(&self, request: SyncBatchRequest) -> Result<PeerMessage, SyncError> {
        let count = self.admit(&request)?;
        let head = self.store.latest_block().await?.position;
        let infos = self
            .store
            .block_infos_in_range(request.from_position, count)
            .await?;
        Ok(PeerMessage::BlockInfos(SyncResponse::from_entities(
            self.node_id.clone(),
            request.from_position,
            infos,
            head,
        )))
    }

    async fn blocks(&self, request: SyncBatchRequest) -> Result<PeerMessage, SyncError> {
        let count = self.admit(&request)?;
        let head = self.store.latest_block().await?.position;
        let blocks = self
            .store
            .blocks_in_range(request.from_position, count)
            .await?;
        Ok(PeerMessage::Blocks(SyncResponse::from_entities(
            self.node_id.clone(),
            request.from_position,
            blocks,
            head,
        )))
    }
}

#[async_trait]
impl PeerMessageHandler for SyncResponder {
    async fn handle(&self, message: PeerMessage) -> Result<PeerMessage, SyncError> {
        match message {
            PeerMessage::BlockInfoRequest(request) => self.block_infos(request).await,
            PeerMessage::BlockRequest(request) => self.blocks(request).await,
            PeerMessage::FreshBlock(_) => Err(SyncError::UnsupportedMessage(Topic::FreshBlock)),
            PeerMessage::BlockInfos(_) => Err(SyncError::UnsupportedMessage(Topic::BlockInfoSync)),
            PeerMessage::Blocks(_) => Err(SyncError::UnsupportedMessage(Topic::BlockSync)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::fixtures::build_chain;
    use shared_types::InMemoryChainStore;

    fn responder() -> SyncResponder {
        let store = Arc::new(InMemoryChainStore::with_chain(build_chain(25, 1)).unwrap());
        SyncResponder::new("peer-1", store, &SyncConfig::for_testing())
    }

    #[tokio::test]
    async fn test_serves_block_infos() {
        let request = SyncBatchRequest::new(11, 10, Topic::BlockInfoSync);
        let reply = responder()
            .handle(PeerMessage::BlockInfoRequest(request))
            .await
            .unwrap();
        let PeerMessage::BlockInfos(response) = reply else {
            panic!("expected block infos");
        };
        assert_eq!(response.entities.len(), 10);
        assert_eq!(response.last_position, 20);
        assert!(!response.last_position_reached);
        assert_eq!(response.node_id, "peer-1");
    }

    #[tokio::test]
    async fn test_serves_blocks_up_to_head() {
        let request = SyncBatchRequest::new(21, 10, Topic::BlockSync);
        let reply = responder()
            .handle(PeerMessage::BlockRequest(request))
            .await
            .unwrap();
        let PeerMessage::Blocks(response) = reply else {
            panic!("expected blocks");
        };
        assert_eq!(response.entities.len(), 5);
        assert!(response.last_position_reached);
    }

    #[tokio::test]
    async fn test_duplicate_request_refused() {
        let responder = responder();
        let request = SyncBatchRequest::new(1, 5, Topic::BlockInfoSync);
        responder
            .handle(PeerMessage::BlockInfoRequest(request.clone()))
            .await
            .unwrap();
        assert!(matches!(
            responder.handle(PeerMessage::BlockInfoRequest(request)).await,
            Err(SyncError::DuplicateRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_non_requests() {
        let block = build_chain(2, 0).remove(1);
        let err = responder()
            .handle(PeerMessage::FreshBlock(block))
            .await
            .unwrap_err();
        assert!(err.is_peer_local());
    }
}
