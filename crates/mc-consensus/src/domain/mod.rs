//! # Domain Layer
//!
//! Pure consensus logic: difficulty retargeting and the nonce search.

pub mod difficulty;
pub mod nonce;

pub use difficulty::retarget;
pub use nonce::{search_nonce, SearchOutcome};
