//! # Node Configuration
//!
//! Unified configuration for the node: identity, worker pool, production
//! cadence, and the nested consensus and sync settings.
//!
//! Defaults are overridden by `MC_*` environment variables.

use mc_chain_sync::SyncConfig;
use mc_consensus::ConsensusConfig;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Complete node configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Identity of this node within the cluster.
    pub node_id: String,
    /// Size of the fixed tokio worker pool.
    pub worker_threads: usize,
    /// Interval between block-production attempts.
    pub production_interval_ms: u64,
    /// Maximum transactions sealed into one block.
    pub max_block_transactions: usize,
    /// Consensus configuration.
    pub consensus: ConsensusConfig,
    /// Chain sync configuration.
    pub sync: SyncConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_id: format!("node-{}", Uuid::new_v4().simple()),
            worker_threads: 4,
            production_interval_ms: 10_000,
            max_block_transactions: 500,
            consensus: ConsensusConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable could not be parsed.
    #[error("Invalid value {value:?} for {key}")]
    InvalidValue {
        /// Variable name
        key: String,
        /// Raw value
        value: String,
    },

    /// A setting must be non-zero.
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

impl NodeConfig {
    /// Create a config for testing (fast production, easy difficulty).
    pub fn for_testing(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            worker_threads: 2,
            production_interval_ms: 50,
            max_block_transactions: 50,
            consensus: ConsensusConfig::for_testing(),
            sync: SyncConfig::for_testing(),
        }
    }

    /// Load defaults overridden by `MC_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load defaults overridden by whatever `lookup` returns per key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(node_id) = lookup("MC_NODE_ID") {
            config.node_id = node_id;
        }
        override_with(&lookup, "MC_WORKER_THREADS", &mut config.worker_threads)?;
        override_with(
            &lookup,
            "MC_PRODUCTION_INTERVAL_MS",
            &mut config.production_interval_ms,
        )?;
        override_with(
            &lookup,
            "MC_MAX_BLOCK_TRANSACTIONS",
            &mut config.max_block_transactions,
        )?;

        let consensus = &mut config.consensus;
        override_with(
            &lookup,
            "MC_TARGET_MINING_RATE_MS",
            &mut consensus.target_mining_rate_ms,
        )?;
        override_with(
            &lookup,
            "MC_MINIMUM_QUORUM_SIZE",
            &mut consensus.minimum_quorum_size,
        )?;
        override_with(
            &lookup,
            "MC_INITIAL_DIFFICULTY",
            &mut consensus.initial_difficulty,
        )?;
        if let Some(raw) = lookup("MC_MAJORITY_BLOCK_THRESHOLD") {
            consensus.majority_block_threshold = Some(parse("MC_MAJORITY_BLOCK_THRESHOLD", raw)?);
        }

        let sync = &mut config.sync;
        override_with(&lookup, "MC_FANOUT_WIDTH", &mut sync.fanout_width)?;
        override_with(&lookup, "MC_MAX_FETCH_RETRIES", &mut sync.max_fetch_retries)?;
        override_with(&lookup, "MC_SCAN_WINDOW_SIZE", &mut sync.scan_window_size)?;
        override_with(&lookup, "MC_BATCH_SIZE", &mut sync.batch_size)?;
        override_with(&lookup, "MC_REQUEST_TIMEOUT_MS", &mut sync.request_timeout_ms)?;
        override_with(
            &lookup,
            "MC_DUPLICATE_CACHE_TTL_SECS",
            &mut sync.duplicate_cache_ttl_secs,
        )?;
        override_with(
            &lookup,
            "MC_DUPLICATE_CACHE_CAPACITY",
            &mut sync.duplicate_cache_capacity,
        )?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the runtime cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_threads == 0 {
            return Err(ConfigError::Zero("worker_threads"));
        }
        if self.production_interval_ms == 0 {
            return Err(ConfigError::Zero("production_interval_ms"));
        }
        if self.max_block_transactions == 0 {
            return Err(ConfigError::Zero("max_block_transactions"));
        }
        if self.sync.fanout_width == 0 {
            return Err(ConfigError::Zero("fanout_width"));
        }
        if self.sync.batch_size == 0 {
            return Err(ConfigError::Zero("batch_size"));
        }
        if self.consensus.target_mining_rate_ms == 0 {
            return Err(ConfigError::Zero("target_mining_rate_ms"));
        }
        Ok(())
    }

    /// Interval between block-production attempts.
    pub fn production_interval(&self) -> Duration {
        Duration::from_millis(self.production_interval_ms)
    }
}

fn parse<T: FromStr>(key: &str, raw: String) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw,
    })
}

fn override_with<F, T>(lookup: &F, key: &str, target: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(raw) = lookup(key) {
        *target = parse(key, raw)?;
    }
    Ok(())
}
