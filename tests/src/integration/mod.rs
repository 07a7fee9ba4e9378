//! # Integration Scenarios
//!
//! Every scenario builds real `NodeContainer`s joined to one `LoopbackHub`.

pub mod production;
pub mod reconciliation;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use node_runtime::adapters::LoopbackHub;
use node_runtime::{NodeConfig, NodeContainer};
use shared_types::{Block, InMemoryChainStore};

/// Join a node holding `chain` to `hub`.
///
/// Block production is effectively disabled (one-hour interval) so only
/// explicit `produce_block` calls forge.
pub fn node(hub: &Arc<LoopbackHub>, node_id: &str, chain: Vec<Block>) -> Arc<NodeContainer> {
    let mut config = NodeConfig::for_testing(node_id);
    config.production_interval_ms = 3_600_000;
    let store = InMemoryChainStore::with_chain(chain).expect("valid fixture chain");
    Arc::new(NodeContainer::on_hub(config, hub, Arc::new(store)))
}

/// Poll `condition` every 10ms for up to five seconds.
pub async fn eventually<F, Fut>(mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition().await {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .is_ok()
}
