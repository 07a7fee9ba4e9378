//! # Proof-of-Work Consensus
//!
//! Forges a block on top of a consistent snapshot of the chain head. The
//! head may move while the nonce search runs; a stale block is rejected when
//! it reaches the `ChainStore`, not here.

use crate::config::ConsensusConfig;
use crate::domain::{retarget, search_nonce, SearchOutcome};
use crate::error::{ConsensusError, Result};
use crate::ports::ConsensusAlgorithm;
use async_trait::async_trait;
use shared_crypto::merkle_root;
use shared_types::{
    current_time_millis, Block, ChainStore, Consent, ConsentType, ProofOfWorkConsent, Transaction,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Clears the running flag when the search thread exits, however it exits.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Proof-of-work block forger.
pub struct ProofOfWorkConsensus {
    store: Arc<dyn ChainStore>,
    config: ConsensusConfig,
    cancelled: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
}

impl ProofOfWorkConsensus {
    /// Create a forger reading the head from `store`.
    pub fn new(store: Arc<dyn ChainStore>, config: ConsensusConfig) -> Self {
        Self {
            store,
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Seal a new block over `transactions`.
    ///
    /// The nonce search runs on the blocking pool and returns
    /// `ConsensusError::Cancelled` if `cancel` is called meanwhile.
    #[tracing::instrument(skip(self, transactions), fields(tx_count = transactions.len()))]
    pub async fn forge(&self, transactions: Vec<Transaction>) -> Result<Block> {
        if transactions.is_empty() {
            return Err(ConsensusError::NoTransactions);
        }
        // Reset before the head reads so a cancel issued during them holds.
        self.cancelled.store(false, Ordering::SeqCst);

        let head = self.store.latest_block().await?;
        let difficulty = self.next_difficulty().await?;
        let timestamp = current_time_millis();
        let candidate = Block {
            position: head.position + 1,
            hash: String::new(),
            last_hash: head.hash,
            transaction_merkle_root: merkle_root(&transactions)?,
            timestamp,
            version: self.config.protocol_version,
            consent: Consent::ProofOfWork(ProofOfWorkConsent {
                difficulty,
                timestamp,
                ..Default::default()
            }),
            transactions,
        };

        debug!(
            "[mc-consensus] Mining block {} at difficulty {}",
            candidate.position, difficulty
        );

        if self.cancelled.load(Ordering::SeqCst) {
            info!("[mc-consensus] Mining cancelled before search");
            return Err(ConsensusError::Cancelled);
        }
        self.running.store(true, Ordering::SeqCst);
        let cancelled = Arc::clone(&self.cancelled);
        let guard = RunningGuard(Arc::clone(&self.running));

        let outcome = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            search_nonce(candidate, difficulty, &cancelled)
        })
        .await
        .map_err(|e| ConsensusError::TaskFailed(e.to_string()))??;

        match outcome {
            SearchOutcome::Sealed(block) => {
                let spent = block
                    .proof_of_work()
                    .map(|pow| pow.milli_seconds_spent_mining)
                    .unwrap_or_default();
                info!(
                    "[mc-consensus] Mined block {} ({}) in {}ms",
                    block.position, block.hash, spent
                );
                Ok(block)
            }
            SearchOutcome::Cancelled => {
                info!("[mc-consensus] Mining cancelled");
                Err(ConsensusError::Cancelled)
            }
        }
    }

    /// Stop an in-progress `forge`.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether a nonce search is active.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn next_difficulty(&self) -> Result<u32> {
        let previous = self.store.latest_of_type(ConsentType::ProofOfWork).await?;
        let difficulty = match previous
            .as_ref()
            .filter(|b| !b.is_genesis())
            .and_then(Block::proof_of_work)
        {
            Some(pow) => retarget(pow, self.config.target_mining_rate_ms),
            None => self.config.initial_difficulty,
        };
        Ok(difficulty)
    }
}

#[async_trait]
impl ConsensusAlgorithm for ProofOfWorkConsensus {
    fn consent_type(&self) -> ConsentType {
        ConsentType::ProofOfWork
    }

    async fn reach_consensus(&self, transactions: Vec<Transaction>) -> Result<Block> {
        self.forge(transactions).await
    }

    fn stop(&self) {
        self.cancel();
    }

    fn is_running(&self) -> bool {
        ProofOfWorkConsensus::is_running(self)
    }
}
