//! Batch ingestion module.
//!
//! Validates batches of raw payloads handed over by the network layer:
//! - Size limits
//! - JSON parsing
//! - Schema validation and normalization
//! - Per-record outcomes with content hashes for rejections

pub mod context;
pub mod ingestion;

pub use context::*;
pub use ingestion::*;
