//! # Value Objects
//!
//! Results reported by the sync strategies.

use shared_types::BlockInfoResult;

/// Outcome of a backward scan.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Highest position where local and majority hashes agree.
    pub fork_position: u64,
    /// Majority infos after the fork position, with the agreeing peers.
    pub missing: BlockInfoResult,
}

impl ScanOutcome {
    /// Whether the local chain already matches everything peers reported.
    pub fn is_in_sync(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Summary of startup reconciliation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Fork point found by the scan (`None` when there were no peers).
    pub fork_position: Option<u64>,
    /// Blocks written to the local chain.
    pub blocks_applied: u64,
    /// Transactions dropped by the pool resync.
    pub transactions_resynced: u64,
}

/// What happened to a block received on the fresh-block topic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FreshBlockOutcome {
    /// Already seen recently.
    Duplicate,
    /// Extended the local head.
    Accepted,
    /// Failed validation and was dropped.
    Rejected,
    /// Was ahead of the local head; catch-up applied this many blocks.
    CaughtUp(u64),
    /// Was at or behind the local head.
    Ignored,
}
