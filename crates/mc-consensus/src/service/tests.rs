use super::*;
use crate::algorithms::{NotYetImplemented, ProofOfWorkConsensus};
use crate::error::ConsensusError;
use crate::ports::MockConsensusAlgorithm;
use async_trait::async_trait;
use shared_types::fixtures::{build_chain, sample_transactions};
use shared_types::{Consent, InMemoryChainStore, StaticNetworkStatistics, StoreError};

fn peers(count: usize) -> Arc<StaticNetworkStatistics> {
    Arc::new(StaticNetworkStatistics::new(
        (0..count).map(|i| format!("node-{i}")).collect(),
    ))
}

fn majority_block() -> Block {
    let mut block = build_chain(2, 5).remove(1);
    block.consent = Consent::ProofOfMajority;
    block
}

struct Harness {
    selector: ConsensusSelector,
    pow: Arc<MockConsensusAlgorithm>,
    majority: Arc<MockConsensusAlgorithm>,
}

/// `chain_length` includes genesis, so `chain_length - 1` mined blocks.
fn harness(active: usize, chain_length: u64, majority_succeeds: bool) -> Harness {
    let chain = build_chain(chain_length, 1);
    let pow = Arc::new(MockConsensusAlgorithm::sealing(
        ConsentType::ProofOfWork,
        chain[1].clone(),
    ));
    let majority = Arc::new(if majority_succeeds {
        MockConsensusAlgorithm::sealing(ConsentType::ProofOfMajority, majority_block())
    } else {
        MockConsensusAlgorithm::failing(ConsentType::ProofOfMajority)
    });
    let selector = ConsensusSelector::new(SelectorDependencies {
        proof_of_work: pow.clone(),
        majority: majority.clone(),
        store: Arc::new(InMemoryChainStore::with_chain(chain).unwrap()),
        network: peers(active),
        config: ConsensusConfig::for_testing(),
    });
    Harness {
        selector,
        pow,
        majority,
    }
}

#[tokio::test]
async fn test_small_network_uses_proof_of_work_only() {
    // quorum 3, threshold 5
    let h = harness(2, 10, true);
    let block = h.selector.reach_consensus(sample_transactions(1, 0)).await.unwrap();
    assert_eq!(block.consent.consent_type(), ConsentType::ProofOfWork);
    assert_eq!(h.majority.calls(), 0);
    assert_eq!(h.pow.calls(), 1);
}

#[tokio::test]
async fn test_young_chain_uses_proof_of_work_only() {
    let h = harness(5, 6, true);
    h.selector.reach_consensus(sample_transactions(1, 0)).await.unwrap();
    assert_eq!(h.majority.calls(), 0);
    assert_eq!(h.pow.calls(), 1);
}

#[tokio::test]
async fn test_eligible_network_tries_majority_first() {
    let h = harness(5, 7, true);
    let block = h.selector.reach_consensus(sample_transactions(1, 0)).await.unwrap();
    assert_eq!(block.consent, Consent::ProofOfMajority);
    assert_eq!(h.majority.calls(), 1);
    assert_eq!(h.pow.calls(), 0);
}

#[tokio::test]
async fn test_majority_failure_falls_back() {
    let h = harness(5, 7, false);
    let block = h.selector.reach_consensus(sample_transactions(1, 0)).await.unwrap();
    assert_eq!(block.consent.consent_type(), ConsentType::ProofOfWork);
    assert_eq!(h.majority.calls(), 1);
    assert_eq!(h.pow.calls(), 1);
}

#[tokio::test]
async fn test_stop_reaches_every_algorithm() {
    let h = harness(1, 2, false);
    h.selector.stop_finding_consensus();
    assert_eq!(h.pow.stops(), 1);
    assert_eq!(h.majority.stops(), 1);
    assert!(!h.selector.is_running());
}

#[tokio::test]
async fn test_stub_majority_with_real_forger() {
    let chain = build_chain(8, 1);
    let store = Arc::new(InMemoryChainStore::with_chain(chain).unwrap());
    let config = ConsensusConfig::for_testing();
    let selector = ConsensusSelector::new(SelectorDependencies {
        proof_of_work: Arc::new(ProofOfWorkConsensus::new(store.clone(), config.clone())),
        majority: Arc::new(NotYetImplemented),
        store: store.clone(),
        network: peers(10),
        config,
    });

    assert!(selector.majority_eligible().await.unwrap());
    let block = selector.reach_consensus(sample_transactions(2, 3)).await.unwrap();
    assert_eq!(block.position, 9);
    store.save(block).await.unwrap();

    assert!(matches!(
        selector.reach_consensus(vec![]).await,
        Err(ConsensusError::NoTransactions)
    ));
}

/// Chain store whose block counters are unavailable.
struct UncountableStore(InMemoryChainStore);

#[async_trait]
impl ChainStore for UncountableStore {
    async fn latest_block(&self) -> std::result::Result<Block, StoreError> {
        self.0.latest_block().await
    }

    async fn latest_of_type(
        &self,
        consent_type: ConsentType,
    ) -> std::result::Result<Option<Block>, StoreError> {
        self.0.latest_of_type(consent_type).await
    }

    async fn blocks_in_range(
        &self,
        from_position: u64,
        count: u64,
    ) -> std::result::Result<Vec<Block>, StoreError> {
        self.0.blocks_in_range(from_position, count).await
    }

    async fn count(&self) -> std::result::Result<u64, StoreError> {
        Err(StoreError::Backend("counter offline".to_string()))
    }

    async fn count_of_type(&self, _: ConsentType) -> std::result::Result<u64, StoreError> {
        Err(StoreError::Backend("counter offline".to_string()))
    }

    async fn save(&self, block: Block) -> std::result::Result<(), StoreError> {
        self.0.save(block).await
    }

    async fn remove_after(&self, position: u64) -> std::result::Result<u64, StoreError> {
        self.0.remove_after(position).await
    }
}

#[tokio::test]
async fn test_unreadable_chain_maturity_falls_back_to_proof_of_work() {
    let chain = build_chain(10, 1);
    let pow = Arc::new(MockConsensusAlgorithm::sealing(
        ConsentType::ProofOfWork,
        chain[1].clone(),
    ));
    let majority = Arc::new(MockConsensusAlgorithm::sealing(
        ConsentType::ProofOfMajority,
        majority_block(),
    ));
    let selector = ConsensusSelector::new(SelectorDependencies {
        proof_of_work: pow.clone(),
        majority: majority.clone(),
        store: Arc::new(UncountableStore(InMemoryChainStore::with_chain(chain).unwrap())),
        network: peers(5),
        config: ConsensusConfig::for_testing(),
    });

    assert!(selector.majority_eligible().await.is_err());
    let block = selector.reach_consensus(sample_transactions(1, 0)).await.unwrap();
    assert_eq!(block.consent.consent_type(), ConsentType::ProofOfWork);
    assert_eq!(majority.calls(), 0);
    assert_eq!(pow.calls(), 1);
}
