//! # Node Container
//!
//! Configuration and dependency injection for one node.

pub mod config;
pub mod subsystems;

pub use config::{ConfigError, NodeConfig};
pub use subsystems::NodeContainer;
