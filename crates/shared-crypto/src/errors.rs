//! Hashing error types.

use thiserror::Error;

/// Failures raised while fingerprinting entities.
///
/// These are configuration faults (an entity that cannot be encoded, an
/// empty Merkle input) rather than transient conditions, so callers surface
/// them instead of retrying.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HashingError {
    /// The canonical encoding of an entity produced no bytes.
    #[error("Canonical serialization is empty")]
    EmptySerialization,

    /// The canonical encoder rejected the entity.
    #[error("Canonical serialization failed: {0}")]
    Serialization(String),

    /// A Merkle root was requested for an empty sequence.
    #[error("Cannot compute a Merkle root over an empty sequence")]
    EmptyMerkleInput,
}
