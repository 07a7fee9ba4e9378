//! # Mempool Adapter
//!
//! In-memory transaction pool. Feeds the production loop and, after chain
//! reconciliation, drops whatever the rewritten chain already contains.

use crate::adapters::ports::TransactionSource;
use async_trait::async_trait;
use mc_chain_sync::{SyncError, TransactionPoolSync};
use parking_lot::RwLock;
use shared_crypto::is_correct;
use shared_types::{ChainStore, Transaction};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Pending transactions keyed by hash.
pub struct MempoolAdapter {
    store: Arc<dyn ChainStore>,
    pending: RwLock<HashMap<String, Transaction>>,
    resync_batch: u64,
}

impl MempoolAdapter {
    /// Create an empty pool checked against `store`.
    pub fn new(store: Arc<dyn ChainStore>) -> Self {
        Self {
            store,
            pending: RwLock::new(HashMap::new()),
            resync_batch: 500,
        }
    }

    /// Add a transaction. Returns `false` for duplicates and for
    /// transactions whose hash does not match their contents.
    pub fn submit(&self, transaction: Transaction) -> bool {
        if !matches!(is_correct(&transaction.hash, &transaction), Ok(true)) {
            debug!("[node] Dropping transaction with bad hash {}", transaction.hash);
            return false;
        }
        let mut pending = self.pending.write();
        if pending.contains_key(&transaction.hash) {
            return false;
        }
        pending.insert(transaction.hash.clone(), transaction);
        true
    }

    /// Number of pending transactions.
    pub fn len(&self) -> usize {
        self.pending.read().len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.read().is_empty()
    }

    async fn included_hashes(&self) -> Result<HashSet<String>, SyncError> {
        let count = self.store.count().await?;
        let mut included = HashSet::new();
        let mut position = 1;
        while position <= count {
            let blocks = self.store.blocks_in_range(position, self.resync_batch).await?;
            if blocks.is_empty() {
                break;
            }
            for block in &blocks {
                included.extend(block.transactions.iter().map(|t| t.hash.clone()));
            }
            position += blocks.len() as u64;
        }
        Ok(included)
    }
}

#[async_trait]
impl TransactionSource for MempoolAdapter {
    async fn pending(&self, limit: usize) -> Vec<Transaction> {
        let mut transactions: Vec<Transaction> = self.pending.read().values().cloned().collect();
        transactions.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.hash.cmp(&b.hash))
        });
        transactions.truncate(limit);
        transactions
    }

    async fn remove_included(&self, hashes: &[String]) -> usize {
        let mut pending = self.pending.write();
        hashes.iter().filter(|h| pending.remove(*h).is_some()).count()
    }
}

#[async_trait]
impl TransactionPoolSync for MempoolAdapter {
    async fn resync_all(&self) -> Result<u64, SyncError> {
        let included = self.included_hashes().await?;
        let mut pending = self.pending.write();
        let before = pending.len();
        pending.retain(|hash, _| !included.contains(hash));
        let dropped = (before - pending.len()) as u64;
        info!(
            "[node] Pool resync dropped {} transactions already in the chain",
            dropped
        );
        Ok(dropped)
    }
}
