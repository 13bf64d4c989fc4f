//! Datastore Schema Core - validation and normalization of dashboard records
//!
//! This crate checks untyped JSON coming back from the dashboard API against
//! declared record schemas and hands typed, fully-populated values to the UI
//! layer. The implementation prioritizes:
//!
//! 1. **Completeness** - every violation in a record is reported in one pass
//! 2. **Determinism** - violations come out in declaration order
//! 3. **No absent defaults** - defaulted fields are always filled in
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `validation` - Schemas, the structural validator, and the schema registry
//! - `models` - Typed datastore and cloud provider records
//! - `pipeline` - Batch validation of raw payloads
//! - `extraction` - Dotted-path resolution and value rendering
//! - `logging` - Structured logging with batch context
//! - `config` - Runtime configuration
//! - `error` - Error types

pub mod config;
pub mod error;
pub mod extraction;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod validation;

use serde_json::Value;

pub use config::ValidatorConfig;
pub use error::{DatastoreError, Result, SchemaError};
pub use models::{decode, decode_str, SchemaBacked};
pub use validation::normalized::{NormalizedRecord, NormalizedValue};
pub use validation::schema::{DefaultValue, FieldKind, Presence, RecordSchema};
pub use validation::validator::validate;
pub use validation::violation::{ValidationFailure, Violation, ViolationKind};

use pipeline::context::BatchContext;
use pipeline::ingestion::{process_batch, BatchResult};
use validation::registry::{get_registry, get_registry_mut, reset_registry};

/// Initialize the logger at the configured level.
///
/// Safe to call repeatedly; only the first call installs the logger.
pub fn init_logger(config: &ValidatorConfig) {
    let _ = env_logger::builder()
        .filter_level(config.log_level)
        .format_timestamp_millis()
        .try_init();
}

/// Parse a raw payload and validate it against a registered schema.
pub fn validate_payload(schema_name: &str, payload: &str) -> Result<NormalizedRecord> {
    let input: Value = serde_json::from_str(payload).map_err(DatastoreError::Parse)?;
    validation::registry::validate_named(schema_name, &input)
}

/// Validate a batch of raw payloads against a registered schema.
///
/// Configuration comes from the environment; see [`ValidatorConfig::from_env`].
pub fn validate_batch(schema_name: &str, payloads: &[String]) -> BatchResult {
    let config = ValidatorConfig::from_env();
    init_logger(&config);

    let ctx = BatchContext::new(schema_name, None, config);
    process_batch(&ctx, payloads)
}

/// Load declarative schema definitions into the process-wide registry.
pub fn load_schema_definitions(json: &str) -> std::result::Result<usize, SchemaError> {
    get_registry_mut().load_definitions(json)
}

/// Reset the process-wide registry to the built-in schemas.
pub fn refresh_schema_registry() {
    reset_registry();
}

/// Names of the schemas currently registered.
pub fn loaded_schemas() -> Vec<String> {
    get_registry().schema_names()
}
