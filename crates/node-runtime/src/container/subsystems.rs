//! # Node Container
//!
//! Holds every subsystem instance of one node and wires them together.
//!
//! ## Initialization Order
//!
//! ```text
//! Level 0: Chain store, transaction pool, transport
//! Level 1: Consensus (store + membership)
//! Level 2: Chain sync engine (store + transport + pool)
//! Level 3: Responder and fresh-block listener (store + sync engine)
//! ```
//!
//! ## Thread Safety
//!
//! All subsystems are wrapped in `Arc`; interior state uses `parking_lot`
//! locks inside the subsystems themselves.

use std::sync::Arc;

use mc_chain_sync::{
    ChainSyncEngine, FreshBlockListener, PeerTransport, SyncDependencies, SyncResponder,
};
use mc_consensus::{ConsensusSelector, NotYetImplemented, ProofOfWorkConsensus, SelectorDependencies};
use shared_types::{ChainStore, InMemoryChainStore, NetworkStatistics, StoreError};
use tracing::{info, instrument};

use crate::adapters::{LoopbackHub, MempoolAdapter};
use crate::container::config::NodeConfig;

/// Every subsystem of one node.
pub struct NodeContainer {
    /// Node configuration.
    pub config: NodeConfig,
    /// Local chain.
    pub store: Arc<dyn ChainStore>,
    /// Pending transactions.
    pub mempool: Arc<MempoolAdapter>,
    /// Cluster transport.
    pub transport: Arc<dyn PeerTransport>,
    /// Cluster membership.
    pub network: Arc<dyn NetworkStatistics>,
    /// Block sealing.
    pub consensus: Arc<ConsensusSelector>,
    /// Chain reconciliation.
    pub sync: Arc<ChainSyncEngine>,
    /// Serves peers' batch requests.
    pub responder: Arc<SyncResponder>,
    /// Ingests peers' fresh blocks.
    pub listener: Arc<FreshBlockListener>,
}

impl NodeContainer {
    /// Wire a node over the given store, transport and membership.
    #[instrument(skip_all, fields(node_id = %config.node_id))]
    pub fn new(
        config: NodeConfig,
        store: Arc<dyn ChainStore>,
        transport: Arc<dyn PeerTransport>,
        network: Arc<dyn NetworkStatistics>,
    ) -> Self {
        let mempool = Arc::new(MempoolAdapter::new(Arc::clone(&store)));

        let consensus = Arc::new(ConsensusSelector::new(SelectorDependencies {
            proof_of_work: Arc::new(ProofOfWorkConsensus::new(
                Arc::clone(&store),
                config.consensus.clone(),
            )),
            majority: Arc::new(NotYetImplemented),
            store: Arc::clone(&store),
            network: Arc::clone(&network),
            config: config.consensus.clone(),
        }));

        let sync = Arc::new(ChainSyncEngine::new(SyncDependencies {
            node_id: config.node_id.clone(),
            config: config.sync.clone(),
            store: Arc::clone(&store),
            network: Arc::clone(&network),
            transport: Arc::clone(&transport),
            pool_sync: mempool.clone(),
        }));

        let responder = Arc::new(SyncResponder::new(
            config.node_id.clone(),
            Arc::clone(&store),
            &config.sync,
        ));
        let listener = Arc::new(FreshBlockListener::new(
            Arc::clone(&store),
            sync.clone(),
            Arc::clone(&transport),
            &config.sync,
        ));

        info!("[node] Subsystems wired for {}", config.node_id);
        Self {
            config,
            store,
            mempool,
            transport,
            network,
            consensus,
            sync,
            responder,
            listener,
        }
    }

    /// Wire a node over `store` and join it to `hub`.
    pub fn on_hub(config: NodeConfig, hub: &Arc<LoopbackHub>, store: Arc<dyn ChainStore>) -> Self {
        let transport = Arc::new(hub.transport(config.node_id.clone()));
        let container = Self::new(config, store, transport.clone(), transport);
        hub.join(
            container.config.node_id.clone(),
            container.responder.clone(),
            container.listener.clone(),
        );
        container
    }

    /// A node alone on its own loopback cluster with a fresh in-memory chain.
    pub fn standalone(config: NodeConfig) -> Result<Self, StoreError> {
        let store = Arc::new(InMemoryChainStore::new()?);
        Ok(Self::on_hub(config, &LoopbackHub::new(), store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_standalone_starts_at_genesis() {
        let container = NodeContainer::standalone(NodeConfig::for_testing("solo")).unwrap();
        assert_eq!(container.store.count().await.unwrap(), 1);
        assert_eq!(container.network.active_node_count().await, 0);
        assert!(container.mempool.is_empty());
    }

    #[tokio::test]
    async fn test_nodes_on_one_hub_see_each_other() {
        let hub = LoopbackHub::new();
        let a = NodeContainer::on_hub(
            NodeConfig::for_testing("a"),
            &hub,
            Arc::new(InMemoryChainStore::new().unwrap()),
        );
        let _b = NodeContainer::on_hub(
            NodeConfig::for_testing("b"),
            &hub,
            Arc::new(InMemoryChainStore::new().unwrap()),
        );
        assert_eq!(a.network.active_node_ids().await, vec!["b".to_string()]);
    }
}
