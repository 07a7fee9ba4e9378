//! # Sync Messages
//!
//! Request/response payloads exchanged between nodes while reconciling
//! chains. Full blocks are only transferred after peers agree on the
//! `BlockInfo` fingerprints of a range.

use crate::entities::{BlockInfo, NodeId};
use serde::{Deserialize, Serialize};
use shared_crypto::Sequential;
use uuid::Uuid;

/// Cluster topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    /// Freshly forged or accepted blocks.
    FreshBlock,
    /// `BlockInfo` digest requests.
    BlockInfoSync,
    /// Full block requests.
    BlockSync,
    /// Transaction-pool resynchronisation.
    TransactionSync,
}

impl Topic {
    /// Wire name of the topic.
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::FreshBlock => "fresh-block",
            Topic::BlockInfoSync => "block-info-sync",
            Topic::BlockSync => "block-sync",
            Topic::TransactionSync => "transaction-sync",
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for one round of peer querying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncBatchRequest {
    /// Correlation id, used by responders for duplicate suppression.
    pub request_id: Uuid,
    /// First requested position.
    pub from_position: u64,
    /// Number of requested positions.
    pub batch_size: u32,
    /// Topic the request is sent on.
    pub topic: Topic,
    /// How many peers the round should reach.
    pub ideal_receive_node_count: u32,
    /// Whole-round retries when too few informative responses arrive.
    pub max_fetch_retries: u32,
    /// Restrict the round to these peers.
    pub selected_node_ids: Option<Vec<NodeId>>,
}

impl SyncBatchRequest {
    /// Create a request with a fresh correlation id.
    pub fn new(from_position: u64, batch_size: u32, topic: Topic) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            from_position,
            batch_size,
            topic,
            ideal_receive_node_count: 1,
            max_fetch_retries: 0,
            selected_node_ids: None,
        }
    }

    /// Set the fan-out width.
    pub fn with_receivers(mut self, ideal_receive_node_count: u32) -> Self {
        self.ideal_receive_node_count = ideal_receive_node_count;
        self
    }

    /// Set the round retry budget.
    pub fn with_retries(mut self, max_fetch_retries: u32) -> Self {
        self.max_fetch_retries = max_fetch_retries;
        self
    }

    /// Restrict the round to specific peers.
    pub fn with_selected_nodes(mut self, node_ids: Vec<NodeId>) -> Self {
        self.selected_node_ids = Some(node_ids);
        self
    }

    /// Same parameters, new correlation id (for a retried round).
    pub fn retried(&self) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            ..self.clone()
        }
    }

    /// Last position covered by the batch.
    pub fn to_position(&self) -> u64 {
        self.from_position
            .saturating_add(u64::from(self.batch_size))
            .saturating_sub(1)
    }
}

/// A peer's reply to a batch request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResponse<T> {
    /// First requested position.
    pub starting_position: u64,
    /// Returned entities in position order.
    pub entities: Vec<T>,
    /// Position of the last returned entity.
    pub last_position: u64,
    /// The responder's head lies inside this batch.
    pub last_position_reached: bool,
    /// Responding node.
    pub node_id: NodeId,
}

impl<T: Sequential> SyncResponse<T> {
    /// Build a response, deriving `last_position` from the entities.
    pub fn from_entities(
        node_id: impl Into<NodeId>,
        starting_position: u64,
        entities: Vec<T>,
        head_position: u64,
    ) -> Self {
        let last_position = entities
            .iter()
            .map(Sequential::sequence)
            .max()
            .unwrap_or_else(|| starting_position.saturating_sub(1));
        Self {
            starting_position,
            entities,
            last_position,
            last_position_reached: last_position >= head_position,
            node_id: node_id.into(),
        }
    }
}

impl SyncResponse<BlockInfo> {
    /// Project into the shape consumed by majority selection.
    pub fn into_block_info_response(self) -> BlockInfoResponse {
        BlockInfoResponse {
            node_id: self.node_id,
            infos: self.entities,
        }
    }
}

/// One peer's view of a range of block infos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfoResponse {
    /// Reporting node.
    pub node_id: NodeId,
    /// Reported infos.
    pub infos: Vec<BlockInfo>,
}

impl BlockInfoResponse {
    /// Create a response.
    pub fn new(node_id: impl Into<NodeId>, infos: Vec<BlockInfo>) -> Self {
        Self {
            node_id: node_id.into(),
            infos,
        }
    }
}

/// Output of majority selection: the agreeing peers and their view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfoResult {
    /// Peers agreeing with the winning view.
    pub node_ids: Vec<NodeId>,
    /// Winning view, sorted by position.
    pub infos: Vec<BlockInfo>,
}

impl BlockInfoResult {
    /// Create a result; infos are sorted by position.
    pub fn new(node_ids: Vec<NodeId>, mut infos: Vec<BlockInfo>) -> Self {
        infos.sort();
        Self { node_ids, infos }
    }

    /// No infos agreed on.
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }

    /// Lowest reported position.
    pub fn first_position(&self) -> Option<u64> {
        self.infos.first().map(|i| i.position)
    }

    /// Highest reported position.
    pub fn last_position(&self) -> Option<u64> {
        self.infos.last().map(|i| i.position)
    }

    /// Info reported at `position`.
    pub fn info_at(&self, position: u64) -> Option<&BlockInfo> {
        self.infos.iter().find(|i| i.position == position)
    }

    /// Keep only infos at or after `position`.
    pub fn retain_from(&mut self, position: u64) {
        self.infos.retain(|i| i.position >= position);
    }

    /// Merge another round's infos, keeping one entry per position.
    pub fn absorb(&mut self, other: BlockInfoResult) {
        for info in other.infos {
            if self.info_at(info.position).is_none() {
                self.infos.push(info);
            }
        }
        self.infos.sort();
        for node in other.node_ids {
            if !self.node_ids.contains(&node) {
                self.node_ids.push(node);
            }
        }
    }
}
