//! # Meridian Consensus
//!
//! Block sealing for the Meridian node.
//!
//! ## Purpose
//!
//! Turn a batch of pending transactions into a block extending the local
//! chain head:
//! - Proof of work with per-block difficulty retargeting
//! - Majority voting slot (placeholder, always falls back)
//! - Algorithm selection from live membership and chain maturity
//!
//! ## Module Structure
//!
//! ```text
//! mc-consensus/
//! ├── domain/          # Difficulty retargeting, nonce search
//! ├── algorithms/      # ProofOfWorkConsensus, NotYetImplemented
//! ├── ports/           # ConsensusApi (inbound) + ConsensusAlgorithm (outbound)
//! ├── service/         # ConsensusSelector
//! ├── config.rs        # ConsensusConfig
//! └── error.rs         # ConsensusError
//! ```
//!
//! ## Concurrency
//!
//! The nonce search is the only long-running CPU loop in the node. It runs
//! on tokio's blocking pool and polls an atomic cancellation flag on every
//! attempt, so `stop_finding_consensus` takes effect within one hash.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

// Re-exports
pub use algorithms::{NotYetImplemented, ProofOfWorkConsensus};
pub use config::ConsensusConfig;
pub use domain::retarget;
pub use error::{ConsensusError, Result};
pub use ports::{ConsensusAlgorithm, ConsensusApi, MockConsensusAlgorithm};
pub use service::{ConsensusSelector, SelectorDependencies};

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
