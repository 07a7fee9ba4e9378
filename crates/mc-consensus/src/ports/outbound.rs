//! # Outbound Ports
//!
//! Pluggable consensus algorithms driven by the selector. Chain and
//! membership reads go through `shared_types::{ChainStore, NetworkStatistics}`.

use crate::error::{ConsensusError, Result};
use async_trait::async_trait;
use shared_types::{Block, ConsentType, Transaction};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub use shared_types::{ChainStore, NetworkStatistics};

/// A strategy that seals a block over a set of transactions.
#[async_trait]
pub trait ConsensusAlgorithm: Send + Sync {
    /// Kind of seal this algorithm produces.
    fn consent_type(&self) -> ConsentType;

    /// Produce a sealed block extending the current head.
    async fn reach_consensus(&self, transactions: Vec<Transaction>) -> Result<Block>;

    /// Ask an in-progress `reach_consensus` to give up.
    fn stop(&self);

    /// Whether a search is currently active.
    fn is_running(&self) -> bool;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock algorithm recording how often it was asked to seal or stop.
pub struct MockConsensusAlgorithm {
    /// Reported consent type.
    pub consent_type: ConsentType,
    /// Block handed back on success; `None` makes every call fail.
    pub block: Option<Block>,
    calls: AtomicUsize,
    stops: AtomicUsize,
    running: AtomicBool,
}

impl MockConsensusAlgorithm {
    /// Mock that always seals `block`.
    pub fn sealing(consent_type: ConsentType, block: Block) -> Self {
        Self::new(consent_type, Some(block))
    }

    /// Mock that always fails with `NotImplemented`.
    pub fn failing(consent_type: ConsentType) -> Self {
        Self::new(consent_type, None)
    }

    fn new(consent_type: ConsentType, block: Option<Block>) -> Self {
        Self {
            consent_type,
            block,
            calls: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
            running: AtomicBool::new(false),
        }
    }

    /// Number of `reach_consensus` calls.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of `stop` calls.
    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConsensusAlgorithm for MockConsensusAlgorithm {
    fn consent_type(&self) -> ConsentType {
        self.consent_type
    }

    async fn reach_consensus(&self, _transactions: Vec<Transaction>) -> Result<Block> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.block
            .clone()
            .ok_or(ConsensusError::NotImplemented(self.consent_type))
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_calls() {
        let mock = MockConsensusAlgorithm::failing(ConsentType::ProofOfMajority);
        assert!(mock.reach_consensus(vec![]).await.is_err());
        mock.stop();
        assert_eq!(mock.calls(), 1);
        assert_eq!(mock.stops(), 1);
        assert!(!mock.is_running());
    }
}
