//! # Shared Types Crate
//!
//! Domain entities, sync messages and boundary ports shared by the
//! consensus and chain-sync subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every cross-subsystem type is defined here.
//! - **Validation at the Boundary**: blocks are checked when they enter a
//!   `ChainStore`, never by the producer.
//! - **Opaque Transactions**: the core only hashes and orders them.

pub mod entities;
pub mod errors;
pub mod expiring_set;
pub mod ports;
pub mod store;
pub mod sync;
pub mod validation;

#[cfg(any(test, feature = "test-utils"))]
pub mod fixtures;

pub use entities::*;
pub use errors::*;
pub use expiring_set::ExpiringKeySet;
pub use ports::{ChainStore, NetworkStatistics, StaticNetworkStatistics};
pub use store::InMemoryChainStore;
pub use sync::*;
pub use validation::{validate_contents, validate_successor};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
