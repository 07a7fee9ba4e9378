//! # Inbound Ports
//!
//! API exposed to the block-production loop.

use crate::error::Result;
use async_trait::async_trait;
use shared_types::{Block, Transaction};

/// Block sealing entry point.
#[async_trait]
pub trait ConsensusApi: Send + Sync {
    /// Seal a block over `transactions` with whichever algorithm applies.
    async fn reach_consensus(&self, transactions: Vec<Transaction>) -> Result<Block>;

    /// Cancel whichever algorithm is currently searching.
    fn stop_finding_consensus(&self);
}
