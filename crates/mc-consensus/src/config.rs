//! # Consensus Configuration
//!
//! Difficulty targeting and majority-voting eligibility thresholds.

use serde::Deserialize;
use shared_types::PROTOCOL_VERSION;

/// Milliseconds in seven days; the default majority-voting threshold is the
/// number of blocks mined in this window at the target rate.
pub const MAJORITY_WINDOW_MS: u64 = 7 * 24 * 60 * 60 * 1000;

/// Runtime configuration for consensus
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    /// Target time spent mining one block (milliseconds)
    pub target_mining_rate_ms: u64,

    /// Minimum active members before majority voting is attempted
    pub minimum_quorum_size: u64,

    /// Mined proof-of-work blocks required before majority voting is
    /// attempted (default: derived from `MAJORITY_WINDOW_MS`)
    pub majority_block_threshold: Option<u64>,

    /// Difficulty used when no mined block exists yet
    pub initial_difficulty: u32,

    /// Protocol version stamped on forged blocks
    pub protocol_version: u32,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            target_mining_rate_ms: 60_000,
            minimum_quorum_size: 50,
            majority_block_threshold: None,
            initial_difficulty: 4,
            protocol_version: PROTOCOL_VERSION,
        }
    }
}

impl ConsensusConfig {
    /// Create a config for testing (trivial difficulty, small thresholds).
    pub fn for_testing() -> Self {
        Self {
            target_mining_rate_ms: 1_000,
            minimum_quorum_size: 3,
            majority_block_threshold: Some(5),
            initial_difficulty: 1,
            protocol_version: PROTOCOL_VERSION,
        }
    }

    /// Proof-of-work block count that must be exceeded for majority voting.
    pub fn majority_block_threshold(&self) -> u64 {
        self.majority_block_threshold
            .unwrap_or_else(|| MAJORITY_WINDOW_MS / self.target_mining_rate_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConsensusConfig::default();
        assert_eq!(config.target_mining_rate_ms, 60_000);
        assert_eq!(config.minimum_quorum_size, 50);
        // One block per minute for a week.
        assert_eq!(config.majority_block_threshold(), 10_080);
    }

    #[test]
    fn test_explicit_threshold_wins() {
        let config = ConsensusConfig::for_testing();
        assert_eq!(config.majority_block_threshold(), 5);
    }
}
