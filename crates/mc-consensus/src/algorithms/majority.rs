//! # Proof-of-Majority Consensus
//!
//! Placeholder for majority voting among active members. Every attempt
//! fails with `NotImplemented`, which the selector turns into a fallback to
//! proof of work.

use crate::error::{ConsensusError, Result};
use crate::ports::ConsensusAlgorithm;
use async_trait::async_trait;
use shared_types::{Block, ConsentType, Transaction};
use tracing::debug;

/// Majority-voting strategy that is not implemented yet.
#[derive(Debug, Default)]
pub struct NotYetImplemented;

#[async_trait]
impl ConsensusAlgorithm for NotYetImplemented {
    fn consent_type(&self) -> ConsentType {
        ConsentType::ProofOfMajority
    }

    async fn reach_consensus(&self, transactions: Vec<Transaction>) -> Result<Block> {
        debug!(
            "[mc-consensus] Majority voting requested for {} transactions",
            transactions.len()
        );
        Err(ConsensusError::NotImplemented(ConsentType::ProofOfMajority))
    }

    fn stop(&self) {}

    fn is_running(&self) -> bool {
        false
    }
}
