//! wall-board/crates/wb-core/src/lib.rs
//!
//! The central domain logic and interface definitions for wall-board:
//! models, storage ports, and the feed aggregation engine.

pub mod error;
pub mod feed;
pub mod models;
pub mod mutate;
pub mod stats;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use traits::*;
