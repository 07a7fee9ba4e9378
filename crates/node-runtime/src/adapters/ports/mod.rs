//! # Node Ports
//!
//! Traits the production loop consumes beyond the subsystem crates.

use async_trait::async_trait;
use shared_types::Transaction;

/// Pending transactions awaiting inclusion.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Up to `limit` pending transactions, oldest first.
    async fn pending(&self, limit: usize) -> Vec<Transaction>;

    /// Forget transactions that made it into a block.
    ///
    /// Returns the number removed.
    async fn remove_included(&self, hashes: &[String]) -> usize;
}
