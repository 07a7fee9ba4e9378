//! Error types for the consensus subsystem

use shared_crypto::HashingError;
use shared_types::{ConsentType, StoreError};
use thiserror::Error;

/// Result type alias for consensus operations
pub type Result<T> = std::result::Result<T, ConsensusError>;

/// Errors that can occur while reaching consensus on a block
#[derive(Debug, Error)]
pub enum ConsensusError {
    /// The search was stopped before a block was sealed
    #[error("Consensus search cancelled")]
    Cancelled,

    /// A block must carry at least one transaction
    #[error("No transactions to seal")]
    NoTransactions,

    /// Algorithm exists only as a placeholder
    #[error("Consensus algorithm not implemented: {0:?}")]
    NotImplemented(ConsentType),

    /// Hashing the candidate block failed
    #[error("Hashing error: {0}")]
    Hashing(#[from] HashingError),

    /// Reading the chain head failed
    #[error("Chain store error: {0}")]
    Store(#[from] StoreError),

    /// The blocking search task panicked or was aborted
    #[error("Mining task failed: {0}")]
    TaskFailed(String),
}

impl ConsensusError {
    /// Check if error only affects the current attempt (skip the cycle, try again)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Cancelled | Self::NoTransactions | Self::NotImplemented(_) | Self::Store(_)
        )
    }

    /// Check if error points at a broken configuration (surface to operator)
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Hashing(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_recoverability() {
        assert!(ConsensusError::Cancelled.is_recoverable());
        assert!(ConsensusError::NotImplemented(ConsentType::ProofOfMajority).is_recoverable());
        assert!(!ConsensusError::Hashing(HashingError::EmptySerialization).is_recoverable());
    }

    #[test]
    fn test_error_criticality() {
        assert!(ConsensusError::Hashing(HashingError::EmptySerialization).is_critical());
        assert!(!ConsensusError::NoTransactions.is_critical());
    }
}
