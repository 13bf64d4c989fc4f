//! Error types for schema construction, validation and typed decoding.

use thiserror::Error;

pub use crate::validation::violation::ValidationFailure;

/// Result type for decoding operations
pub type Result<T> = std::result::Result<T, DatastoreError>;

/// Errors raised while building schemas or loading schema definitions.
///
/// These are programming/configuration errors, kept apart from per-record
/// [`ValidationFailure`]s.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Schema name must not be empty")]
    EmptySchemaName,

    #[error("Invalid field name in schema {schema}: {field:?}")]
    InvalidFieldName { schema: String, field: String },

    #[error("Duplicate field in schema {schema}: {field}")]
    DuplicateField { schema: String, field: String },

    #[error("Default for {schema}.{field} does not match kind {expected}")]
    DefaultKindMismatch {
        schema: String,
        field: String,
        expected: String,
    },

    #[error("Schema not found: {0}")]
    UnknownSchema(String),

    #[error("Schema already registered: {0}")]
    DuplicateSchema(String),

    #[error("Invalid schema definition: {0}")]
    InvalidDefinition(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Top-level error for validating and decoding datastore records.
#[derive(Error, Debug)]
pub enum DatastoreError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("JSON parse error: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Decode error: {0}")]
    Decode(#[source] serde_json::Error),
}

impl DatastoreError {
    /// Violations carried by a validation failure, empty for other errors.
    pub fn violations(&self) -> &[crate::validation::violation::Violation] {
        match self {
            DatastoreError::Validation(failure) => failure.violations(),
            _ => &[],
        }
    }
}
