//! Declarative record schemas.
//!
//! A schema is plain data: an ordered list of fields, each with an explicit
//! [`FieldKind`] tag and a [`Presence`] rule. Nested records are referenced
//! through `Arc<RecordSchema>` so one schema can be shared by many parents
//! and by many threads.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::SchemaError;
use crate::validation::normalized::NormalizedValue;

lazy_static! {
    /// Field names are wire keys: ASCII identifiers only.
    static ref FIELD_NAME_PATTERN: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// Kind tag of a field.
#[derive(Debug, Clone)]
pub enum FieldKind {
    String,
    /// Whole numbers only, see `validator::coerce_integer`.
    Integer,
    Boolean,
    Record(Arc<RecordSchema>),
    Sequence(Box<FieldKind>),
    /// String keys to values of the inner kind.
    Mapping(Box<FieldKind>),
}

impl FieldKind {
    pub fn record(schema: &Arc<RecordSchema>) -> Self {
        FieldKind::Record(Arc::clone(schema))
    }

    pub fn sequence(item: FieldKind) -> Self {
        FieldKind::Sequence(Box::new(item))
    }

    pub fn mapping(value: FieldKind) -> Self {
        FieldKind::Mapping(Box::new(value))
    }

    /// Name used for `expected` in violations.
    pub fn name(&self) -> String {
        match self {
            FieldKind::String => "string".to_string(),
            FieldKind::Integer => "integer".to_string(),
            FieldKind::Boolean => "boolean".to_string(),
            FieldKind::Record(schema) => format!("record {}", schema.name()),
            FieldKind::Sequence(item) => format!("sequence<{}>", item.name()),
            FieldKind::Mapping(value) => format!("mapping<{}>", value.name()),
        }
    }

    /// Whether an already-normalized value is of this kind.
    pub fn admits(&self, value: &NormalizedValue) -> bool {
        match (self, value) {
            (FieldKind::String, NormalizedValue::String(_)) => true,
            (FieldKind::Integer, NormalizedValue::Integer(_)) => true,
            (FieldKind::Boolean, NormalizedValue::Boolean(_)) => true,
            (FieldKind::Record(schema), NormalizedValue::Record(record)) => {
                record.schema() == schema.name()
            }
            (FieldKind::Sequence(item), NormalizedValue::Sequence(items)) => {
                items.iter().all(|v| item.admits(v))
            }
            (FieldKind::Mapping(inner), NormalizedValue::Mapping(entries)) => {
                entries.values().all(|v| inner.admits(v))
            }
            _ => false,
        }
    }
}

/// Value substituted for an absent field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    EmptyString,
    EmptySequence,
    EmptyMapping,
    Literal(NormalizedValue),
}

impl DefaultValue {
    /// Builds a new value on every call; nothing is shared between records.
    pub fn materialize(&self) -> NormalizedValue {
        match self {
            DefaultValue::EmptyString => NormalizedValue::String(String::new()),
            DefaultValue::EmptySequence => NormalizedValue::Sequence(Vec::new()),
            DefaultValue::EmptyMapping => NormalizedValue::Mapping(BTreeMap::new()),
            DefaultValue::Literal(value) => value.clone(),
        }
    }
}

/// What happens when a field is absent from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence {
    /// Absence is a `missing` violation.
    Required,
    /// Absence yields [`NormalizedValue::NotProvided`].
    Optional,
    /// Absence yields the default.
    Default(DefaultValue),
}

/// One declared field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub presence: Presence,
}

impl FieldSpec {
    pub fn is_required(&self) -> bool {
        matches!(self.presence, Presence::Required)
    }
}

/// Ordered field declarations for one record type.
#[derive(Debug, Clone)]
pub struct RecordSchema {
    name: String,
    fields: Vec<FieldSpec>,
}

impl RecordSchema {
    pub fn builder(name: &str) -> RecordSchemaBuilder {
        RecordSchemaBuilder {
            name: name.to_string(),
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.is_required())
    }
}

/// Collects field declarations; all checks run in [`build`](Self::build).
#[derive(Debug)]
pub struct RecordSchemaBuilder {
    name: String,
    fields: Vec<FieldSpec>,
}

impl RecordSchemaBuilder {
    pub fn field(mut self, name: &str, kind: FieldKind, presence: Presence) -> Self {
        self.fields.push(FieldSpec {
            name: name.to_string(),
            kind,
            presence,
        });
        self
    }

    pub fn required(self, name: &str, kind: FieldKind) -> Self {
        self.field(name, kind, Presence::Required)
    }

    pub fn optional(self, name: &str, kind: FieldKind) -> Self {
        self.field(name, kind, Presence::Optional)
    }

    pub fn defaulted(self, name: &str, kind: FieldKind, default: DefaultValue) -> Self {
        self.field(name, kind, Presence::Default(default))
    }

    pub fn build(self) -> Result<RecordSchema, SchemaError> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::EmptySchemaName);
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !FIELD_NAME_PATTERN.is_match(&field.name) {
                return Err(SchemaError::InvalidFieldName {
                    schema: self.name.clone(),
                    field: field.name.clone(),
                });
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    schema: self.name.clone(),
                    field: field.name.clone(),
                });
            }
            if let Presence::Default(default) = &field.presence {
                if !field.kind.admits(&default.materialize()) {
                    return Err(SchemaError::DefaultKindMismatch {
                        schema: self.name.clone(),
                        field: field.name.clone(),
                        expected: field.kind.name(),
                    });
                }
            }
        }

        log::debug!(
            "SCHEMA_BUILT name={} fields={}",
            self.name,
            self.fields.len()
        );

        Ok(RecordSchema {
            name: self.name,
            fields: self.fields,
        })
    }
}
