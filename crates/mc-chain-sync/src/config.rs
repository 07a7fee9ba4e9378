//! # Chain Sync Configuration
//!
//! Fan-out width, retry budget and duplicate-suppression bounds.

use serde::Deserialize;
use std::time::Duration;

/// Chain sync configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Peers queried per round.
    pub fanout_width: u32,

    /// Whole-round retries when too few informative responses arrive.
    pub max_fetch_retries: u32,

    /// Non-empty responses needed before a round is accepted.
    pub min_informative_responses: usize,

    /// Positions compared per backward scanning step.
    pub scan_window_size: u64,

    /// Positions requested per forward batch.
    pub batch_size: u32,

    /// Bound on a single peer call, in milliseconds.
    pub request_timeout_ms: u64,

    /// How long a seen block id or request id suppresses duplicates.
    pub duplicate_cache_ttl_secs: u64,

    /// Maximum ids remembered per duplicate cache.
    pub duplicate_cache_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fanout_width: 50,
            max_fetch_retries: 3,
            min_informative_responses: 1,
            scan_window_size: 10,
            batch_size: 50,
            request_timeout_ms: 10_000,
            duplicate_cache_ttl_secs: 300,
            duplicate_cache_capacity: 10_000,
        }
    }
}

impl SyncConfig {
    /// Create a config for testing (smaller values).
    pub fn for_testing() -> Self {
        Self {
            fanout_width: 10,
            max_fetch_retries: 1,
            min_informative_responses: 1,
            scan_window_size: 10,
            batch_size: 20,
            request_timeout_ms: 500,
            duplicate_cache_ttl_secs: 60,
            duplicate_cache_capacity: 100,
        }
    }

    /// Per-call timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Duplicate cache entry lifetime.
    pub fn duplicate_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.duplicate_cache_ttl_secs)
    }
}
