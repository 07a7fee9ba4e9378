//! # Domain Layer
//!
//! Sync errors, peer messages and the results reported by the sync
//! strategies.

pub mod errors;
pub mod messages;
pub mod value_objects;

pub use errors::SyncError;
pub use messages::PeerMessage;
pub use value_objects::{FreshBlockOutcome, ReconcileReport, ScanOutcome};
