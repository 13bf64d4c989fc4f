//! Datastore records as returned by the dashboard API.

use std::collections::BTreeMap;
use std::sync::Arc;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::models::SchemaBacked;
use crate::validation::schema::{DefaultValue, FieldKind, RecordSchema};

lazy_static! {
    pub static ref DATASTORE_ENV_SCHEMA: Arc<RecordSchema> = Arc::new(
        RecordSchema::builder("DatastoreEnv")
            .required("name", FieldKind::String)
            .defaulted(
                "linked_applications",
                FieldKind::sequence(FieldKind::String),
                DefaultValue::EmptySequence,
            )
            .defaulted(
                "secret_variables",
                FieldKind::mapping(FieldKind::String),
                DefaultValue::EmptyMapping,
            )
            .defaulted(
                "variables",
                FieldKind::mapping(FieldKind::String),
                DefaultValue::EmptyMapping,
            )
            .required("version", FieldKind::Integer)
            .build()
            .expect("DatastoreEnv schema")
    );

    pub static ref DATASTORE_METADATA_SCHEMA: Arc<RecordSchema> = Arc::new(
        RecordSchema::builder("DatastoreMetadataEntry")
            .required("name", FieldKind::String)
            .defaulted("value", FieldKind::String, DefaultValue::EmptyString)
            .build()
            .expect("DatastoreMetadataEntry schema")
    );

    pub static ref DATASTORE_SCHEMA: Arc<RecordSchema> = Arc::new(
        RecordSchema::builder("Datastore")
            .required("name", FieldKind::String)
            .required("type", FieldKind::String)
            .defaulted("status", FieldKind::String, DefaultValue::EmptyString)
            .defaulted(
                "metadata",
                FieldKind::sequence(FieldKind::record(&DATASTORE_METADATA_SCHEMA)),
                DefaultValue::EmptySequence,
            )
            .optional("env", FieldKind::record(&DATASTORE_ENV_SCHEMA))
            .defaulted("connection_string", FieldKind::String, DefaultValue::EmptyString)
            .build()
            .expect("Datastore schema")
    );

    pub static ref DATASTORE_LIST_RESPONSE_SCHEMA: Arc<RecordSchema> = Arc::new(
        RecordSchema::builder("DatastoreListResponse")
            .required("datastores", FieldKind::sequence(FieldKind::record(&DATASTORE_SCHEMA)))
            .build()
            .expect("DatastoreListResponse schema")
    );
}

/// Environment group attached to a datastore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatastoreEnv {
    pub name: String,
    pub linked_applications: Vec<String>,
    pub secret_variables: BTreeMap<String, String>,
    pub variables: BTreeMap<String, String>,
    pub version: i64,
}

/// One name/value metadata pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatastoreMetadataEntry {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datastore {
    pub name: String,
    #[serde(rename = "type")]
    pub datastore_type: String,
    pub status: String,
    pub metadata: Vec<DatastoreMetadataEntry>,
    /// `None` when the API did not send an env at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<DatastoreEnv>,
    pub connection_string: String,
}

impl Datastore {
    /// Value of the metadata entry called `name`.
    pub fn metadata_value(&self, name: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatastoreListResponse {
    pub datastores: Vec<Datastore>,
}

impl SchemaBacked for DatastoreEnv {
    fn schema() -> Arc<RecordSchema> {
        Arc::clone(&*DATASTORE_ENV_SCHEMA)
    }
}

impl SchemaBacked for DatastoreMetadataEntry {
    fn schema() -> Arc<RecordSchema> {
        Arc::clone(&*DATASTORE_METADATA_SCHEMA)
    }
}

impl SchemaBacked for Datastore {
    fn schema() -> Arc<RecordSchema> {
        Arc::clone(&*DATASTORE_SCHEMA)
    }
}

impl SchemaBacked for DatastoreListResponse {
    fn schema() -> Arc<RecordSchema> {
        Arc::clone(&*DATASTORE_LIST_RESPONSE_SCHEMA)
    }
}
