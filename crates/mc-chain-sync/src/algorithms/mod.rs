//! # Algorithms
//!
//! - `fanout`: quorum-based concurrent peer requests
//! - `majority`: gap filtering, clustering and majority selection
//! - `scan_matcher`: fork-point search between two views of a range

pub mod fanout;
pub mod majority;
pub mod scan_matcher;

pub use fanout::{minimum_desired, FanoutMessenger};
pub use majority::{choose, is_contiguous, is_peaceful};
pub use scan_matcher::find_fork_point;
