//! Normalized validation output.
//!
//! A [`NormalizedRecord`] holds every declared field of its schema, in
//! declaration order, each with a value of exactly the declared kind.
//! Fields declared optional without a default are [`NormalizedValue::NotProvided`]
//! when absent and are omitted when the record is turned back into JSON.

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// A value whose kind matches its field declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    Record(NormalizedRecord),
    Sequence(Vec<NormalizedValue>),
    Mapping(BTreeMap<String, NormalizedValue>),
    NotProvided,
}

impl NormalizedValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            NormalizedValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            NormalizedValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            NormalizedValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&NormalizedRecord> {
        match self {
            NormalizedValue::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[NormalizedValue]> {
        match self {
            NormalizedValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, NormalizedValue>> {
        match self {
            NormalizedValue::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_provided(&self) -> bool {
        !matches!(self, NormalizedValue::NotProvided)
    }

    /// JSON form of the value. `NotProvided` becomes `null`; inside a record
    /// such fields are dropped instead.
    pub fn to_json(&self) -> Value {
        match self {
            NormalizedValue::String(s) => Value::String(s.clone()),
            NormalizedValue::Integer(i) => Value::from(*i),
            NormalizedValue::Boolean(b) => Value::Bool(*b),
            NormalizedValue::Record(r) => r.to_json(),
            NormalizedValue::Sequence(items) => {
                Value::Array(items.iter().map(NormalizedValue::to_json).collect())
            }
            NormalizedValue::Mapping(m) => Value::Object(
                m.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect::<Map<String, Value>>(),
            ),
            NormalizedValue::NotProvided => Value::Null,
        }
    }
}

impl Serialize for NormalizedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NormalizedValue::String(s) => serializer.serialize_str(s),
            NormalizedValue::Integer(i) => serializer.serialize_i64(*i),
            NormalizedValue::Boolean(b) => serializer.serialize_bool(*b),
            NormalizedValue::Record(r) => r.serialize(serializer),
            NormalizedValue::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            NormalizedValue::Mapping(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            NormalizedValue::NotProvided => serializer.serialize_none(),
        }
    }
}

/// Output of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    schema: String,
    fields: Vec<(String, NormalizedValue)>,
}

impl NormalizedRecord {
    pub(crate) fn new(schema: &str, fields: Vec<(String, NormalizedValue)>) -> Self {
        Self {
            schema: schema.to_string(),
            fields,
        }
    }

    /// Name of the schema this record was validated against.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn get(&self, field: &str) -> Option<&NormalizedValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut NormalizedValue> {
        self.fields
            .iter_mut()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(NormalizedValue::as_str)
    }

    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(NormalizedValue::as_i64)
    }

    /// Fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NormalizedValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        for (name, value) in &self.fields {
            if value.is_provided() {
                obj.insert(name.clone(), value.to_json());
            }
        }
        Value::Object(obj)
    }
}

impl Serialize for NormalizedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let provided = self.fields.iter().filter(|(_, v)| v.is_provided());
        let mut map = serializer.serialize_map(Some(provided.clone().count()))?;
        for (name, value) in provided {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
