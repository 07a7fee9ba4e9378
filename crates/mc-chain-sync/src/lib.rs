//! # Meridian Chain Sync
//!
//! Keeps the local chain in line with the majority of the network.
//!
//! ## Purpose
//!
//! - Quorum fan-out of batch requests to a random subset of peers
//! - Majority selection among the returned block-info views
//! - Scanning strategy: walk back window by window to the fork point
//! - Confident strategy: fetch forward, trusting the batch only if it
//!   overlaps the local head
//! - Serving peers' batch requests and reacting to fresh blocks
//!
//! ## Module Structure
//!
//! ```text
//! mc-chain-sync/
//! ├── domain/          # SyncError, PeerMessage, ScanOutcome, ReconcileReport
//! ├── algorithms/      # FanoutMessenger, choose, find_fork_point
//! ├── ports/           # ChainSyncApi + PeerMessageHandler (inbound)
//! │                    # PeerTransport + TransactionPoolSync (outbound)
//! ├── application/     # ChainSyncEngine, SyncResponder, FreshBlockListener
//! └── config.rs        # SyncConfig
//! ```
//!
//! ## Trust Model
//!
//! No single peer is trusted. Full blocks are only requested for infos a
//! majority cluster agreed on, only from the peers in that cluster, and
//! every downloaded block is re-hashed and linked to its parent before the
//! local chain is touched.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use algorithms::{choose, find_fork_point, minimum_desired, FanoutMessenger};
pub use application::{ChainSyncEngine, FreshBlockListener, SyncDependencies, SyncResponder};
pub use config::SyncConfig;
pub use domain::{FreshBlockOutcome, PeerMessage, ReconcileReport, ScanOutcome, SyncError};
pub use ports::{
    ChainSyncApi, MockPeerNetwork, MockTransactionPoolSync, PeerMessageHandler, PeerTransport,
    TransactionPoolSync,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
