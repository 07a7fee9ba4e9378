//! # Boundary Ports
//!
//! Contracts the consensus and sync subsystems consume. Persistence and
//! membership tracking live behind these traits.

use crate::entities::{Block, BlockInfo, ConsentType, NodeId};
use crate::errors::StoreError;
use async_trait::async_trait;
use parking_lot::RwLock;

/// Chain repository.
///
/// `save` validates structural correctness and rejects (never silently
/// drops) a block that does not chain onto the current head.
#[async_trait]
pub trait ChainStore: Send + Sync {
    /// Current head of the chain.
    async fn latest_block(&self) -> Result<Block, StoreError>;

    /// Most recent block sealed by `consent_type`.
    async fn latest_of_type(&self, consent_type: ConsentType) -> Result<Option<Block>, StoreError>;

    /// Up to `count` blocks starting at `from_position`, in position order.
    async fn blocks_in_range(&self, from_position: u64, count: u64)
        -> Result<Vec<Block>, StoreError>;

    /// Number of stored blocks (genesis included).
    async fn count(&self) -> Result<u64, StoreError>;

    /// Number of stored blocks sealed by `consent_type`.
    async fn count_of_type(&self, consent_type: ConsentType) -> Result<u64, StoreError>;

    /// Validate and append a block.
    async fn save(&self, block: Block) -> Result<(), StoreError>;

    /// Drop every block above `position`; returns how many were removed.
    async fn remove_after(&self, position: u64) -> Result<u64, StoreError>;

    /// Block stored at `position`.
    async fn block_at(&self, position: u64) -> Result<Option<Block>, StoreError> {
        Ok(self.blocks_in_range(position, 1).await?.into_iter().next())
    }

    /// Fingerprints of up to `count` blocks starting at `from_position`.
    async fn block_infos_in_range(
        &self,
        from_position: u64,
        count: u64,
    ) -> Result<Vec<BlockInfo>, StoreError> {
        Ok(self
            .blocks_in_range(from_position, count)
            .await?
            .iter()
            .map(Block::info)
            .collect())
    }
}

/// Live cluster membership.
#[async_trait]
pub trait NetworkStatistics: Send + Sync {
    /// Ids of currently active peers (excluding this node).
    async fn active_node_ids(&self) -> Vec<NodeId>;

    /// Number of currently active peers.
    async fn active_node_count(&self) -> u64 {
        self.active_node_ids().await.len() as u64
    }
}

/// Membership snapshot maintained by whoever tracks peers.
#[derive(Debug, Default)]
pub struct StaticNetworkStatistics {
    nodes: RwLock<Vec<NodeId>>,
}

impl StaticNetworkStatistics {
    /// Start with a known member list.
    pub fn new(nodes: Vec<NodeId>) -> Self {
        Self {
            nodes: RwLock::new(nodes),
        }
    }

    /// Replace the member list.
    pub fn set_nodes(&self, nodes: Vec<NodeId>) {
        *self.nodes.write() = nodes;
    }

    /// Add a member if absent.
    pub fn join(&self, node: NodeId) {
        let mut nodes = self.nodes.write();
        if !nodes.contains(&node) {
            nodes.push(node);
        }
    }

    /// Remove a member.
    pub fn leave(&self, node: &str) {
        self.nodes.write().retain(|n| n != node);
    }
}

#[async_trait]
impl NetworkStatistics for StaticNetworkStatistics {
    async fn active_node_ids(&self) -> Vec<NodeId> {
        self.nodes.read().clone()
    }
}
