//! # Shared Crypto - Chain Fingerprinting Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-512 → SHA3-512 | Block/transaction identity, PoW target check |
//! | `merkle` | Pairwise double-digest tree | Transaction set fingerprint |
//!
//! ## Properties
//!
//! - **Deterministic**: canonical `bincode` encoding, field order fixed by declaration
//! - **Order-independent**: list hashing and Merkle roots sort by natural sequence first
//! - **Thread-safe**: per-call digest instances, no shared hasher state

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;
pub mod merkle;

// Re-exports
pub use errors::HashingError;
pub use hashing::{
    canonical_bytes, double_digest, hash, hash_list, is_correct, leading_hex_zeros,
    meets_difficulty, Digest512, Hashable, Sequential,
};
pub use merkle::merkle_root;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
