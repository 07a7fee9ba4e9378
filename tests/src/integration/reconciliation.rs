//! # Startup Reconciliation
//!
//! A node rejoining the cluster adopts the majority chain:
//!
//! 1. Scan back from its head to the fork point
//! 2. Download the agreed blocks from the agreeing peers
//! 3. Replace its diverged suffix
//! 4. Drop pooled transactions the new chain already contains

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use node_runtime::adapters::{LoopbackHub, TransactionSource};
    use node_runtime::NodeRuntime;
    use shared_types::fixtures::{build_chain, fork_chain};
    use shared_types::ChainStore;

    use crate::integration::node;

    #[tokio::test]
    async fn test_rejoining_node_adopts_majority_fork() {
        let main = build_chain(20, 1);
        let fork = fork_chain(&main, 14, 25, 2);

        let hub = LoopbackHub::new();
        for id in ["n1", "n2", "n3", "n4"] {
            node(&hub, id, fork.clone());
        }
        let late = node(&hub, "late", main.clone());
        // Mined on the majority fork, and orphaned on the local one.
        late.mempool.submit(fork[16].transactions[0].clone());
        late.mempool.submit(main[17].transactions[0].clone());

        let runtime = NodeRuntime::new(Arc::clone(&late));
        let report = runtime.start().await.unwrap();
        runtime.shutdown().await;

        assert_eq!(report.fork_position, Some(14));
        assert_eq!(report.blocks_applied, 11);
        assert_eq!(report.transactions_resynced, 1);
        assert_eq!(late.store.latest_block().await.unwrap(), fork[24]);
        assert_eq!(late.store.block_at(14).await.unwrap().unwrap(), main[13]);

        let pending = late.mempool.pending(10).await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].hash, main[17].transactions[0].hash);
    }

    #[tokio::test]
    async fn test_fresh_node_syncs_from_genesis() {
        let main = build_chain(45, 1);
        let hub = LoopbackHub::new();
        for id in ["n1", "n2", "n3"] {
            node(&hub, id, main.clone());
        }
        let fresh = node(&hub, "fresh", main[..1].to_vec());

        let report = fresh.sync.reconcile_on_startup().await.unwrap();

        assert_eq!(report.fork_position, Some(1));
        assert_eq!(report.blocks_applied, 44);
        assert_eq!(fresh.store.latest_block().await.unwrap(), main[44]);
    }

    #[tokio::test]
    async fn test_node_ahead_of_network_keeps_its_blocks() {
        let main = build_chain(30, 1);
        let hub = LoopbackHub::new();
        for id in ["n1", "n2", "n3"] {
            node(&hub, id, main[..22].to_vec());
        }
        let ahead = node(&hub, "ahead", main.clone());

        let report = ahead.sync.reconcile_on_startup().await.unwrap();

        assert_eq!(report.fork_position, Some(22));
        assert_eq!(report.blocks_applied, 0);
        assert_eq!(ahead.store.count().await.unwrap(), 30);
    }

    #[tokio::test]
    async fn test_minority_liar_cannot_rewrite_history() {
        let main = build_chain(20, 1);
        let fork = fork_chain(&main, 10, 24, 3);

        let hub = LoopbackHub::new();
        for id in ["n1", "n2", "n3", "n4"] {
            node(&hub, id, main.clone());
        }
        node(&hub, "liar", fork);
        let local = node(&hub, "local", main[..15].to_vec());

        local.sync.reconcile_on_startup().await.unwrap();

        assert_eq!(local.store.latest_block().await.unwrap(), main[19]);
    }
}
