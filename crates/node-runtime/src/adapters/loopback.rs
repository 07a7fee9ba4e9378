//! # Loopback Cluster
//!
//! In-process stand-in for the cluster transport. Every node joined to a
//! `LoopbackHub` can request batches from the others and broadcast fresh
//! blocks to them. Delivery of broadcasts is detached: the sender never
//! waits for a receiver to ingest the block.

use async_trait::async_trait;
use mc_chain_sync::{
    FreshBlockListener, PeerMessage, PeerMessageHandler, PeerTransport, SyncError,
};
use parking_lot::RwLock;
use shared_types::{NetworkStatistics, NodeId, Topic};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone)]
struct Member {
    responder: Arc<dyn PeerMessageHandler>,
    listener: Arc<FreshBlockListener>,
}

/// Shared membership of an in-process cluster.
#[derive(Default)]
pub struct LoopbackHub {
    members: RwLock<BTreeMap<NodeId, Member>>,
}

impl LoopbackHub {
    /// Create an empty cluster.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Add (or replace) a member.
    pub fn join(
        &self,
        node_id: impl Into<NodeId>,
        responder: Arc<dyn PeerMessageHandler>,
        listener: Arc<FreshBlockListener>,
    ) {
        let node_id = node_id.into();
        debug!("[node] {} joined the loopback cluster", node_id);
        self.members.write().insert(
            node_id,
            Member {
                responder,
                listener,
            },
        );
    }

    /// Remove a member. Requests to it fail from now on.
    pub fn leave(&self, node_id: &str) {
        self.members.write().remove(node_id);
    }

    /// Current member ids, sorted.
    pub fn members(&self) -> Vec<NodeId> {
        self.members.read().keys().cloned().collect()
    }

    /// Transport used by `node_id`.
    pub fn transport(self: &Arc<Self>, node_id: impl Into<NodeId>) -> LoopbackTransport {
        LoopbackTransport {
            node_id: node_id.into(),
            hub: Arc::clone(self),
        }
    }

    fn member(&self, node_id: &str) -> Option<Member> {
        self.members.read().get(node_id).cloned()
    }
}

/// One node's view of the loopback cluster.
///
/// Doubles as that node's `NetworkStatistics`: every other member counts as
/// active.
#[derive(Clone)]
pub struct LoopbackTransport {
    node_id: NodeId,
    hub: Arc<LoopbackHub>,
}

#[async_trait]
impl PeerTransport for LoopbackTransport {
    async fn request(
        &self,
        node_id: &str,
        _topic: Topic,
        message: PeerMessage,
    ) -> Result<PeerMessage, SyncError> {
        debug!(
            "[node] {} -> {}: {}",
            self.node_id,
            node_id,
            message.kind()
        );
        let member = self.hub.member(node_id).ok_or_else(|| SyncError::PeerRequest {
            node_id: node_id.to_string(),
            reason: "not a cluster member".to_string(),
        })?;
        member.responder.handle(message).await
    }

    async fn broadcast(&self, topic: Topic, message: PeerMessage) -> Result<(), SyncError> {
        let PeerMessage::FreshBlock(block) = message else {
            warn!(
                "[node] Refusing to broadcast {} on {}",
                message.kind(),
                topic
            );
            return Err(SyncError::UnsupportedMessage(topic));
        };

        let receivers: Vec<(NodeId, Arc<FreshBlockListener>)> = self
            .hub
            .members
            .read()
            .iter()
            .filter(|(id, _)| **id != self.node_id)
            .map(|(id, member)| (id.clone(), Arc::clone(&member.listener)))
            .collect();

        for (node_id, listener) in receivers {
            let block = block.clone();
            tokio::spawn(async move {
                match listener.on_fresh_block(block).await {
                    Ok(outcome) => {
                        debug!("[node] {} ingested fresh block: {:?}", node_id, outcome)
                    }
                    Err(e) => warn!("[node] {} failed to ingest fresh block: {}", node_id, e),
                }
            });
        }
        Ok(())
    }
}

#[async_trait]
impl NetworkStatistics for LoopbackTransport {
    async fn active_node_ids(&self) -> Vec<NodeId> {
        self.hub
            .members()
            .into_iter()
            .filter(|id| *id != self.node_id)
            .collect()
    }
}
