//! # Error Types
//!
//! Errors raised at the storage boundary.

use shared_crypto::HashingError;
use thiserror::Error;

/// A block failed structural checks and was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainValidationError {
    /// Block does not extend the current head.
    #[error("Position mismatch: expected {expected}, got {actual}")]
    PositionMismatch { expected: u64, actual: u64 },

    /// `last_hash` does not point at the current head.
    #[error("Last hash mismatch at position {position}")]
    LastHashMismatch { position: u64 },

    /// Stored hash does not match the recomputed seal hash.
    #[error("Hash mismatch at position {position}")]
    HashMismatch { position: u64 },

    /// Proof-of-work hash lacks the required leading zeros.
    #[error("Insufficient difficulty at position {position}: need {difficulty} leading zeros")]
    InsufficientDifficulty { position: u64, difficulty: u32 },

    /// Transaction Merkle root does not match the carried transactions.
    #[error("Merkle root mismatch at position {position}")]
    MerkleRootMismatch { position: u64 },

    /// A non-genesis block carries no transactions.
    #[error("Block at position {position} carries no transactions")]
    EmptyTransactions { position: u64 },

    /// Block with this hash is already stored.
    #[error("Block already known: {hash}")]
    AlreadyKnown { hash: String },

    /// Hashing the block failed.
    #[error("Hashing failed: {0}")]
    Hashing(#[from] HashingError),
}

/// Errors returned by a `ChainStore`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Block rejected at the boundary.
    #[error("Validation failed: {0}")]
    Validation(#[from] ChainValidationError),

    /// The genesis block cannot be removed.
    #[error("Genesis block is immutable")]
    GenesisImmutable,

    /// Backend failure.
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl From<HashingError> for StoreError {
    fn from(e: HashingError) -> Self {
        StoreError::Validation(ChainValidationError::Hashing(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        let err = ChainValidationError::PositionMismatch {
            expected: 5,
            actual: 7,
        };
        assert!(err.to_string().contains("expected 5"));

        let err = ChainValidationError::InsufficientDifficulty {
            position: 9,
            difficulty: 3,
        };
        assert!(err.to_string().contains("3 leading zeros"));
    }

    #[test]
    fn test_store_error_wraps_validation() {
        let err: StoreError = ChainValidationError::HashMismatch { position: 2 }.into();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(err.to_string().contains("position 2"));
    }
}
