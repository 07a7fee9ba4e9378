//! # Adapter Implementations
//!
//! Concrete implementations of the ports the subsystems and the
//! production loop consume:
//!
//! - `mempool`: pending transactions (`TransactionSource`,
//!   `TransactionPoolSync`)
//! - `loopback`: in-process cluster (`PeerTransport`, `NetworkStatistics`)

pub mod loopback;
pub mod mempool;
pub mod ports;

pub use loopback::{LoopbackHub, LoopbackTransport};
pub use mempool::MempoolAdapter;
pub use ports::TransactionSource;
