//! # Consensus Algorithms
//!
//! - `proof_of_work`: nonce search with per-block difficulty retargeting
//! - `majority`: majority-voting placeholder

pub mod majority;
pub mod proof_of_work;

pub use majority::NotYetImplemented;
pub use proof_of_work::ProofOfWorkConsensus;
