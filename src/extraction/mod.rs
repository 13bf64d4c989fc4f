//! Value extraction helpers.
//!
//! Dotted-path resolution into raw and normalized records, plus value
//! rendering used by violation reports.

pub mod json_path;

pub use json_path::*;
