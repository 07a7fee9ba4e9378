//! # Meridian Test Suite
//!
//! Cross-crate scenarios run over an in-process loopback cluster.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/
//! │   ├── reconciliation.rs   # Startup reconciliation against a majority
//! │   └── production.rs       # Forging, propagation, catch-up
//! └── benches/
//!     └── sync_benchmarks.rs  # Hashing, Merkle roots, majority selection
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p mc-tests
//! cargo bench -p mc-tests
//! ```

pub mod integration;
