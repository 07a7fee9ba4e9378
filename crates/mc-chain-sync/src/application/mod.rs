//! # Application Layer
//!
//! - `service`: the reconciliation engine (scanning and confident strategies)
//! - `responder`: serves peers' batch requests from local storage
//! - `listener`: reacts to freshly forged blocks

pub mod listener;
pub mod responder;
pub mod service;

pub use listener::FreshBlockListener;
pub use responder::SyncResponder;
pub use service::{ChainSyncEngine, SyncDependencies};
