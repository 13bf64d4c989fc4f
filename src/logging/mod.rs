//! Structured logging with batch context.
//!
//! Provides logging macros and utilities that include the batch id and
//! record index in every pipeline log message for easy correlation.

pub mod structured;

pub use structured::*;
