//! # Block Production and Propagation
//!
//! A forged block is saved locally, broadcast on the fresh-block topic and
//! ingested by every other member: appended when it is next in line,
//! followed by a catch-up round when the receiver is behind.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use node_runtime::adapters::LoopbackHub;
    use node_runtime::NodeRuntime;
    use shared_types::fixtures::{build_chain, sample_transactions};
    use shared_types::{ChainStore, ConsentType};

    use crate::integration::{eventually, node};

    #[tokio::test]
    async fn test_forged_block_reaches_every_member() {
        let hub = LoopbackHub::new();
        let genesis = build_chain(1, 0);
        let forger = node(&hub, "forger", genesis.clone());
        let others = [
            node(&hub, "n1", genesis.clone()),
            node(&hub, "n2", genesis.clone()),
        ];

        for tx in sample_transactions(3, 11) {
            forger.mempool.submit(tx);
        }
        let runtime = NodeRuntime::new(Arc::clone(&forger));
        let block = runtime.produce_block().await.unwrap().unwrap();

        assert_eq!(block.position, 2);
        assert!(block.proof_of_work().is_some());
        for other in &others {
            let store = Arc::clone(&other.store);
            assert!(eventually(|| {
                let store = Arc::clone(&store);
                async move { store.count().await.unwrap() == 2 }
            })
            .await);
            assert_eq!(other.store.latest_block().await.unwrap(), block);
        }
    }

    #[tokio::test]
    async fn test_lagging_member_catches_up_on_fresh_block() {
        let main = build_chain(9, 1);
        let hub = LoopbackHub::new();
        let forger = node(&hub, "forger", main.clone());
        node(&hub, "n1", main.clone());
        let lagging = node(&hub, "lagging", main[..5].to_vec());

        for tx in sample_transactions(2, 77) {
            forger.mempool.submit(tx);
        }
        let runtime = NodeRuntime::new(Arc::clone(&forger));
        let block = runtime.produce_block().await.unwrap().unwrap();
        assert_eq!(block.position, 10);

        let store = Arc::clone(&lagging.store);
        assert!(eventually(|| {
            let store = Arc::clone(&store);
            async move { store.count().await.unwrap() == 10 }
        })
        .await);
        assert_eq!(lagging.store.latest_block().await.unwrap(), block);
        assert_eq!(lagging.store.block_at(7).await.unwrap().unwrap(), main[6]);
    }

    #[tokio::test]
    async fn test_majority_slot_falls_back_to_proof_of_work() {
        // Testing thresholds: quorum of 3 members, more than 5 mined blocks.
        let main = build_chain(8, 1);
        let hub = LoopbackHub::new();
        let forger = node(&hub, "forger", main.clone());
        for id in ["n1", "n2", "n3"] {
            node(&hub, id, main.clone());
        }
        assert!(forger.consensus.majority_eligible().await.unwrap());

        for tx in sample_transactions(1, 5) {
            forger.mempool.submit(tx);
        }
        let block = NodeRuntime::new(Arc::clone(&forger))
            .produce_block()
            .await
            .unwrap()
            .unwrap();

        assert_eq!(block.consent.consent_type(), ConsentType::ProofOfWork);
        assert_eq!(block.position, 9);
    }

    #[tokio::test]
    async fn test_shutdown_stops_production_loop() {
        let hub = LoopbackHub::new();
        let solo = node(&hub, "solo", build_chain(1, 0));
        let runtime = NodeRuntime::new(Arc::clone(&solo));

        runtime.start().await.unwrap();
        runtime.shutdown().await;

        for tx in sample_transactions(2, 3) {
            solo.mempool.submit(tx);
        }
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        assert_eq!(solo.store.count().await.unwrap(), 1);
    }
}
