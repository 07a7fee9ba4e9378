//! Consensus Selector - algorithm dispatch
//!
//! # Policy
//! - Majority voting only with a large enough live membership AND a mature
//!   proof-of-work chain; if either cannot be read, proof of work
//! - Any majority-voting failure falls back to proof of work
//! - Stopping cancels every algorithm, whichever is active

use crate::config::ConsensusConfig;
use crate::error::Result;
use crate::ports::{ConsensusAlgorithm, ConsensusApi};
use async_trait::async_trait;
use shared_types::{Block, ChainStore, ConsentType, NetworkStatistics, Transaction};
use std::sync::Arc;
use tracing::{debug, warn};

/// Chooses the consensus algorithm for each block.
pub struct ConsensusSelector {
    proof_of_work: Arc<dyn ConsensusAlgorithm>,
    majority: Arc<dyn ConsensusAlgorithm>,
    store: Arc<dyn ChainStore>,
    network: Arc<dyn NetworkStatistics>,
    config: ConsensusConfig,
}

/// Dependencies for ConsensusSelector
pub struct SelectorDependencies {
    /// Default algorithm
    pub proof_of_work: Arc<dyn ConsensusAlgorithm>,
    /// Algorithm tried first once eligible
    pub majority: Arc<dyn ConsensusAlgorithm>,
    /// Source of the mined-block count
    pub store: Arc<dyn ChainStore>,
    /// Source of the active member count
    pub network: Arc<dyn NetworkStatistics>,
    /// Eligibility thresholds
    pub config: ConsensusConfig,
}

impl ConsensusSelector {
    /// Create a selector from its dependencies.
    pub fn new(deps: SelectorDependencies) -> Self {
        Self {
            proof_of_work: deps.proof_of_work,
            majority: deps.majority,
            store: deps.store,
            network: deps.network,
            config: deps.config,
        }
    }

    /// Whether majority voting should be attempted for the next block.
    pub async fn majority_eligible(&self) -> Result<bool> {
        let active = self.network.active_node_count().await;
        if active < self.config.minimum_quorum_size {
            return Ok(false);
        }
        let mined = self.store.count_of_type(ConsentType::ProofOfWork).await?;
        Ok(mined > self.config.majority_block_threshold())
    }

    /// Seal a block, preferring majority voting when eligible.
    pub async fn reach_consensus(&self, transactions: Vec<Transaction>) -> Result<Block> {
        let eligible = self.majority_eligible().await.unwrap_or_else(|e| {
            warn!(
                "[mc-consensus] Majority eligibility unknown, using proof of work: {}",
                e
            );
            false
        });
        if eligible {
            debug!("[mc-consensus] Attempting majority voting");
            match self.majority.reach_consensus(transactions.clone()).await {
                Ok(block) => return Ok(block),
                Err(e) => warn!(
                    "[mc-consensus] Majority voting failed, falling back to proof of work: {}",
                    e
                ),
            }
        }
        self.proof_of_work.reach_consensus(transactions).await
    }

    /// Cancel whichever algorithm is searching.
    pub fn stop_finding_consensus(&self) {
        self.majority.stop();
        self.proof_of_work.stop();
    }

    /// Whether any algorithm is searching.
    pub fn is_running(&self) -> bool {
        self.majority.is_running() || self.proof_of_work.is_running()
    }
}

#[async_trait]
impl ConsensusApi for ConsensusSelector {
    async fn reach_consensus(&self, transactions: Vec<Transaction>) -> Result<Block> {
        ConsensusSelector::reach_consensus(self, transactions).await
    }

    fn stop_finding_consensus(&self) {
        ConsensusSelector::stop_finding_consensus(self);
    }
}

#[cfg(test)]
mod tests;
