//! Named schema registry.
//!
//! Holds the built-in datastore schemas and any schemas loaded at runtime
//! from declarative JSON definitions such as:
//!
//! ```json
//! [
//!   {
//!     "name": "Addon",
//!     "fields": [
//!       {"name": "name", "kind": "string", "required": true},
//!       {"name": "replicas", "kind": "integer", "default": 1},
//!       {"name": "datastores", "kind": {"sequence": {"record": "Datastore"}}, "default": []}
//!     ]
//!   }
//! ]
//! ```
//!
//! Record kinds refer to schemas by name; a definition may only reference
//! schemas registered before it (or earlier in the same document).

use std::collections::HashMap;
use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DatastoreError, SchemaError};
use crate::models::builtin_schemas;
use crate::validation::normalized::NormalizedRecord;
use crate::validation::schema::{DefaultValue, FieldKind, Presence, RecordSchema};
use crate::validation::validator::{normalize_value, validate};

/// Kind as written in a schema definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindDefinition {
    String,
    Integer,
    Boolean,
    Record(String),
    Sequence(Box<KindDefinition>),
    Mapping(Box<KindDefinition>),
}

/// One field of a schema definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub kind: KindDefinition,
    #[serde(default)]
    pub required: bool,
    /// Absent with `required = false` means the field is optional without a
    /// default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Declarative form of a [`RecordSchema`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub name: String,
    pub fields: Vec<FieldDefinition>,
}

/// Schemas by name, in registration order.
#[derive(Debug, Default, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<RecordSchema>>,
    order: Vec<String>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the datastore and cloud provider schemas.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for schema in builtin_schemas() {
            registry.insert(schema);
        }
        registry
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Schema names in registration order.
    pub fn schema_names(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn get(&self, name: &str) -> Option<Arc<RecordSchema>> {
        self.schemas.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn register(&mut self, schema: RecordSchema) -> Result<Arc<RecordSchema>, SchemaError> {
        if self.contains(schema.name()) {
            return Err(SchemaError::DuplicateSchema(schema.name().to_string()));
        }
        let schema = Arc::new(schema);
        self.insert(Arc::clone(&schema));
        Ok(schema)
    }

    fn insert(&mut self, schema: Arc<RecordSchema>) {
        self.order.push(schema.name().to_string());
        self.schemas.insert(schema.name().to_string(), schema);
    }

    /// Load a JSON array of schema definitions.
    ///
    /// Either every definition is registered or none is. Returns the number
    /// of schemas added.
    pub fn load_definitions(&mut self, json: &str) -> Result<usize, SchemaError> {
        let definitions: Vec<SchemaDefinition> = serde_json::from_str(json)?;

        let mut staged = self.clone();
        for definition in &definitions {
            let schema = staged.build_definition(definition)?;
            staged.register(schema)?;
        }
        *self = staged;

        log::info!(
            "SCHEMA_DEFINITIONS_LOADED added={} schemas={:?}",
            definitions.len(),
            self.schema_names()
        );

        Ok(definitions.len())
    }

    /// Turn a definition into a schema, resolving record references against
    /// this registry.
    pub fn build_definition(&self, definition: &SchemaDefinition) -> Result<RecordSchema, SchemaError> {
        let mut builder = RecordSchema::builder(&definition.name);

        for field in &definition.fields {
            let kind = self.resolve_kind(&field.kind)?;
            let presence = match (&field.default, field.required) {
                (Some(_), true) => {
                    return Err(SchemaError::InvalidDefinition(format!(
                        "{}.{} is required and has a default",
                        definition.name, field.name
                    )));
                }
                (None, true) => Presence::Required,
                (None, false) => Presence::Optional,
                (Some(raw), false) => Presence::Default(default_from_json(
                    &definition.name,
                    &field.name,
                    &kind,
                    raw,
                )?),
            };
            builder = builder.field(&field.name, kind, presence);
        }

        builder.build()
    }

    fn resolve_kind(&self, kind: &KindDefinition) -> Result<FieldKind, SchemaError> {
        Ok(match kind {
            KindDefinition::String => FieldKind::String,
            KindDefinition::Integer => FieldKind::Integer,
            KindDefinition::Boolean => FieldKind::Boolean,
            KindDefinition::Record(name) => FieldKind::Record(
                self.get(name)
                    .ok_or_else(|| SchemaError::UnknownSchema(name.clone()))?,
            ),
            KindDefinition::Sequence(item) => FieldKind::sequence(self.resolve_kind(item)?),
            KindDefinition::Mapping(value) => FieldKind::mapping(self.resolve_kind(value)?),
        })
    }

    /// Validate `input` against the schema registered as `name`.
    pub fn validate(&self, name: &str, input: &Value) -> Result<NormalizedRecord, DatastoreError> {
        let schema = self
            .get(name)
            .ok_or_else(|| SchemaError::UnknownSchema(name.to_string()))?;
        Ok(validate(&schema, input)?)
    }

    /// Drop everything, including the built-ins.
    pub fn clear(&mut self) {
        self.schemas.clear();
        self.order.clear();
    }
}

/// Empty JSON values map to the empty-default constructors; anything else
/// must normalize as a literal of the field's kind.
fn default_from_json(
    schema: &str,
    field: &str,
    kind: &FieldKind,
    raw: &Value,
) -> Result<DefaultValue, SchemaError> {
    let mismatch = || SchemaError::DefaultKindMismatch {
        schema: schema.to_string(),
        field: field.to_string(),
        expected: kind.name(),
    };

    match (kind, raw) {
        (FieldKind::String, Value::String(s)) if s.is_empty() => Ok(DefaultValue::EmptyString),
        (FieldKind::Sequence(_), Value::Array(a)) if a.is_empty() => Ok(DefaultValue::EmptySequence),
        (FieldKind::Mapping(_), Value::Object(o)) if o.is_empty() => Ok(DefaultValue::EmptyMapping),
        _ => normalize_value(kind, raw)
            .map(DefaultValue::Literal)
            .map_err(|_| mismatch()),
    }
}

lazy_static! {
    static ref SCHEMA_REGISTRY: RwLock<SchemaRegistry> = RwLock::new(SchemaRegistry::with_builtins());
}

/// Read access to the process-wide registry.
pub fn get_registry() -> RwLockReadGuard<'static, SchemaRegistry> {
    SCHEMA_REGISTRY.read()
}

/// Write access to the process-wide registry.
pub fn get_registry_mut() -> RwLockWriteGuard<'static, SchemaRegistry> {
    SCHEMA_REGISTRY.write()
}

/// Restore the process-wide registry to the built-ins only.
pub fn reset_registry() {
    *get_registry_mut() = SchemaRegistry::with_builtins();
    log::info!("SCHEMA_REGISTRY_RESET");
}

/// Look `name` up in the process-wide registry.
///
/// The read lock is released before validation runs.
pub fn lookup_schema(name: &str) -> Option<Arc<RecordSchema>> {
    get_registry().get(name)
}

/// Validate against a schema from the process-wide registry.
pub fn validate_named(name: &str, input: &Value) -> Result<NormalizedRecord, DatastoreError> {
    let schema = lookup_schema(name).ok_or_else(|| SchemaError::UnknownSchema(name.to_string()))?;
    Ok(validate(&schema, input)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::normalized::NormalizedValue;
    use serde_json::json;

    const ADDON_DEFINITIONS: &str = r#"[
        {
            "name": "AddonTag",
            "fields": [
                {"name": "key", "kind": "string", "required": true},
                {"name": "value", "kind": "string", "default": ""}
            ]
        },
        {
            "name": "Addon",
            "fields": [
                {"name": "name", "kind": "string", "required": true},
                {"name": "replicas", "kind": "integer", "default": 1},
                {"name": "public", "kind": "boolean", "default": false},
                {"name": "tags", "kind": {"sequence": {"record": "AddonTag"}}, "default": []},
                {"name": "datastore", "kind": {"record": "Datastore"}},
                {"name": "labels", "kind": {"mapping": "string"}, "default": {"team": "core"}}
            ]
        }
    ]"#;

    #[test]
    fn test_builtins_registered() {
        let registry = SchemaRegistry::with_builtins();
        assert_eq!(registry.len(), 7);
        assert!(registry.contains("CloudProviderDatastore"));
        assert_eq!(registry.schema_names()[0], "DatastoreEnv");
    }

    #[test]
    fn test_load_definitions() {
        let mut registry = SchemaRegistry::with_builtins();
        assert_eq!(registry.load_definitions(ADDON_DEFINITIONS).unwrap(), 2);

        let record = registry.validate("Addon", &json!({"name": "metrics"})).unwrap();
        assert_eq!(
            record.to_json(),
            json!({
                "name": "metrics",
                "replicas": 1,
                "public": false,
                "tags": [],
                "labels": {"team": "core"}
            })
        );
        assert_eq!(record.get("datastore"), Some(&NormalizedValue::NotProvided));

        let err = registry
            .validate("Addon", &json!({"name": "m", "datastore": {"name": "d"}}))
            .unwrap_err();
        assert_eq!(err.violations()[0].path, "datastore.type");
    }

    #[test]
    fn test_load_is_all_or_nothing() {
        let mut registry = SchemaRegistry::with_builtins();
        let json = r#"[
            {"name": "First", "fields": [{"name": "a", "kind": "string", "required": true}]},
            {"name": "Second", "fields": [{"name": "b", "kind": {"record": "Missing"}}]}
        ]"#;
        let err = registry.load_definitions(json).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownSchema(ref name) if name == "Missing"));
        assert!(!registry.contains("First"));
        assert_eq!(registry.len(), 7);
    }

    #[test]
    fn test_duplicate_schema_rejected() {
        let mut registry = SchemaRegistry::with_builtins();
        let json = r#"[{"name": "Datastore", "fields": []}]"#;
        assert!(matches!(
            registry.load_definitions(json).unwrap_err(),
            SchemaError::DuplicateSchema(_)
        ));
    }

    #[test]
    fn test_required_with_default_rejected() {
        let mut registry = SchemaRegistry::new();
        let json = r#"[{"name": "Bad", "fields": [{"name": "a", "kind": "string", "required": true, "default": ""}]}]"#;
        assert!(matches!(
            registry.load_definitions(json).unwrap_err(),
            SchemaError::InvalidDefinition(_)
        ));
    }

    #[test]
    fn test_default_of_wrong_kind_rejected() {
        let mut registry = SchemaRegistry::new();
        let json = r#"[{"name": "Bad", "fields": [{"name": "n", "kind": "integer", "default": 1.5}]}]"#;
        assert!(matches!(
            registry.load_definitions(json).unwrap_err(),
            SchemaError::DefaultKindMismatch { .. }
        ));
    }

    #[test]
    fn test_malformed_definition_json() {
        let mut registry = SchemaRegistry::new();
        assert!(matches!(
            registry.load_definitions(r#"[{"name": "X"}]"#).unwrap_err(),
            SchemaError::Json(_)
        ));
    }

    #[test]
    fn test_unknown_schema_name() {
        let registry = SchemaRegistry::new();
        let err = registry.validate("Nope", &json!({})).unwrap_err();
        assert!(matches!(err, DatastoreError::Schema(SchemaError::UnknownSchema(_))));
    }

    #[test]
    fn test_global_registry_has_builtins() {
        assert!(lookup_schema("Datastore").is_some());
        let record = validate_named("CloudProvider", &json!({"cloud_provider_id": "x", "project_id": 4})).unwrap();
        assert_eq!(record.get_i64("project_id"), Some(4));
    }
}
