//! Typed datastore records.
//!
//! Each record type carries the schema it is validated against. [`decode`]
//! validates raw JSON, applies defaults and deserializes the normalized
//! result, so callers never see an absent defaulted field.

pub mod cloud_provider;
pub mod datastore;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{DatastoreError, Result};
use crate::validation::schema::RecordSchema;
use crate::validation::validator::validate;

pub use cloud_provider::*;
pub use datastore::*;

/// A record type with a declared schema.
pub trait SchemaBacked: DeserializeOwned {
    fn schema() -> Arc<RecordSchema>;
}

/// Validate `input` against `T`'s schema and deserialize the normalized record.
pub fn decode<T: SchemaBacked>(input: &Value) -> Result<T> {
    let schema = T::schema();
    let normalized = validate(&schema, input)?;
    serde_json::from_value(normalized.to_json()).map_err(DatastoreError::Decode)
}

/// Parse JSON text, then [`decode`] it.
pub fn decode_str<T: SchemaBacked>(text: &str) -> Result<T> {
    let input: Value = serde_json::from_str(text).map_err(DatastoreError::Parse)?;
    decode(&input)
}

/// The built-in record schemas, nested schemas before their parents.
pub fn builtin_schemas() -> Vec<Arc<RecordSchema>> {
    vec![
        DatastoreEnv::schema(),
        DatastoreMetadataEntry::schema(),
        Datastore::schema(),
        DatastoreListResponse::schema(),
        CloudProvider::schema(),
        CloudProviderListResponse::schema(),
        CloudProviderDatastore::schema(),
    ]
}
