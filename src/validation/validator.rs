//! Structural validation and normalization.
//!
//! [`validate`] walks a [`RecordSchema`] in declaration order against an
//! untyped JSON value and either returns a [`NormalizedRecord`] or every
//! violation it found. It never stops at the first problem: sibling fields,
//! sequence elements and mapping entries are all checked in one pass.
//!
//! Integer policy: a field declared `integer` accepts only whole numbers.
//! `2` and `2.0` both normalize to `2`; `2.5`, `"2"` and values outside the
//! `i64` range are type mismatches.

use std::collections::BTreeMap;

use serde_json::{Map, Number, Value};

use crate::extraction::json_path::{join_path, json_kind, render_value};
use crate::validation::normalized::{NormalizedRecord, NormalizedValue};
use crate::validation::schema::{FieldKind, Presence, RecordSchema};
use crate::validation::violation::{ValidationFailure, Violation};

/// Validate `input` against `schema`.
///
/// Unknown keys in the input are ignored. JSON `null` counts as a present
/// value of the wrong kind, never as absence.
pub fn validate(schema: &RecordSchema, input: &Value) -> Result<NormalizedRecord, ValidationFailure> {
    let obj = match input.as_object() {
        Some(obj) => obj,
        None => {
            let violation = Violation::type_mismatch(
                "",
                format!("record {}", schema.name()),
                render_value(input),
            );
            log::debug!(
                "VALIDATION_FAILED schema={} violations=1 reason=root_not_object",
                schema.name()
            );
            return Err(ValidationFailure::single(schema.name(), violation));
        }
    };

    let mut violations = Vec::new();
    let record = validate_fields(schema, obj, "", &mut violations);

    match ValidationFailure::new(schema.name(), violations) {
        Some(failure) => {
            log::debug!(
                "VALIDATION_FAILED schema={} violations={}",
                schema.name(),
                failure.len()
            );
            Err(failure)
        }
        None => {
            log::debug!(
                "VALIDATION_PASSED schema={} fields={}",
                schema.name(),
                record.len()
            );
            Ok(record)
        }
    }
}

/// Validate a lone value against `kind`. Paths in the returned violations
/// are relative to the value itself.
pub fn normalize_value(kind: &FieldKind, input: &Value) -> Result<NormalizedValue, Vec<Violation>> {
    let mut violations = Vec::new();
    match validate_value(kind, input, "", &mut violations) {
        Some(value) if violations.is_empty() => Ok(value),
        _ => Err(violations),
    }
}

/// Validate each declared field of `schema` found in `obj`.
///
/// Fields that fail are filled with `NotProvided`; the record is only
/// returned to callers when `violations` stays empty.
fn validate_fields(
    schema: &RecordSchema,
    obj: &Map<String, Value>,
    path: &str,
    violations: &mut Vec<Violation>,
) -> NormalizedRecord {
    let mut fields = Vec::with_capacity(schema.fields().len());

    for field in schema.fields() {
        let field_path = join_path(path, &field.name);

        let value = match (obj.get(&field.name), &field.presence) {
            (Some(raw), _) => validate_value(&field.kind, raw, &field_path, violations),
            (None, Presence::Required) => {
                violations.push(Violation::missing(&field_path, field.kind.name()));
                None
            }
            (None, Presence::Optional) => Some(NormalizedValue::NotProvided),
            (None, Presence::Default(default)) => Some(default.materialize()),
        };

        fields.push((
            field.name.clone(),
            value.unwrap_or(NormalizedValue::NotProvided),
        ));
    }

    NormalizedRecord::new(schema.name(), fields)
}

/// Validate one present value. `None` means a violation was recorded for
/// this exact path.
fn validate_value(
    kind: &FieldKind,
    raw: &Value,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Option<NormalizedValue> {
    let normalized = match (kind, raw) {
        (FieldKind::String, Value::String(s)) => Some(NormalizedValue::String(s.clone())),
        (FieldKind::Integer, Value::Number(n)) => coerce_integer(n).map(NormalizedValue::Integer),
        (FieldKind::Boolean, Value::Bool(b)) => Some(NormalizedValue::Boolean(*b)),
        (FieldKind::Record(schema), Value::Object(obj)) => Some(NormalizedValue::Record(
            validate_fields(schema, obj, path, violations),
        )),
        (FieldKind::Sequence(item), Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for (index, element) in items.iter().enumerate() {
                let element_path = join_path(path, &index.to_string());
                out.push(
                    validate_value(item, element, &element_path, violations)
                        .unwrap_or(NormalizedValue::NotProvided),
                );
            }
            Some(NormalizedValue::Sequence(out))
        }
        (FieldKind::Mapping(inner), Value::Object(entries)) => {
            let mut out = BTreeMap::new();
            let mut sorted: Vec<(&String, &Value)> = entries.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));
            for (key, entry) in sorted {
                let entry_path = join_path(path, key);
                if let Some(value) = validate_value(inner, entry, &entry_path, violations) {
                    out.insert(key.clone(), value);
                }
            }
            Some(NormalizedValue::Mapping(out))
        }
        _ => None,
    };

    if normalized.is_none() {
        log::debug!(
            "TYPE_MISMATCH path={} expected={} found={}",
            path,
            kind.name(),
            json_kind(raw)
        );
        violations.push(Violation::type_mismatch(path, kind.name(), render_value(raw)));
    }
    normalized
}

/// Whole-number check for `integer` fields.
fn coerce_integer(n: &Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    if n.is_u64() {
        // Above i64::MAX.
        return None;
    }
    let f = n.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::schema::DefaultValue;
    use crate::validation::violation::ViolationKind;
    use serde_json::json;
    use std::sync::Arc;

    fn entry_schema() -> Arc<RecordSchema> {
        Arc::new(
            RecordSchema::builder("Entry")
                .required("name", FieldKind::String)
                .defaulted("value", FieldKind::String, DefaultValue::EmptyString)
                .build()
                .unwrap(),
        )
    }

    fn parent_schema() -> RecordSchema {
        RecordSchema::builder("Parent")
            .required("id", FieldKind::Integer)
            .defaulted("enabled", FieldKind::Boolean, DefaultValue::Literal(NormalizedValue::Boolean(true)))
            .defaulted(
                "entries",
                FieldKind::sequence(FieldKind::record(&entry_schema())),
                DefaultValue::EmptySequence,
            )
            .defaulted(
                "labels",
                FieldKind::mapping(FieldKind::String),
                DefaultValue::EmptyMapping,
            )
            .optional("child", FieldKind::record(&entry_schema()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let record = validate(&parent_schema(), &json!({"id": 7})).unwrap();
        assert_eq!(
            record.to_json(),
            json!({"id": 7, "enabled": true, "entries": [], "labels": {}})
        );
        assert_eq!(record.get("child"), Some(&NormalizedValue::NotProvided));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let record = validate(&parent_schema(), &json!({"id": 1, "extra": {"deep": true}})).unwrap();
        assert!(record.get("extra").is_none());
        assert_eq!(record.len(), 5);
    }

    #[test]
    fn test_root_not_object() {
        let failure = validate(&parent_schema(), &json!([1, 2])).unwrap_err();
        assert_eq!(failure.len(), 1);
        let v = &failure.violations()[0];
        assert_eq!(v.path, "");
        assert_eq!(v.kind, ViolationKind::TypeMismatch);
        assert_eq!(v.expected, "record Parent");
        assert_eq!(v.actual, "[1,2]");
    }

    #[test]
    fn test_integer_policy() {
        let schema = parent_schema();
        assert_eq!(validate(&schema, &json!({"id": 2.0})).unwrap().get_i64("id"), Some(2));
        assert_eq!(validate(&schema, &json!({"id": -4})).unwrap().get_i64("id"), Some(-4));

        for bad in [json!(2.5), json!("2"), json!(u64::MAX), json!(1e300), json!(true)] {
            let failure = validate(&schema, &json!({ "id": bad })).unwrap_err();
            let v = failure.at("id").unwrap();
            assert_eq!(v.kind, ViolationKind::TypeMismatch);
            assert_eq!(v.expected, "integer");
        }
    }

    #[test]
    fn test_null_is_mismatch_not_absence() {
        let failure = validate(&parent_schema(), &json!({"id": 1, "labels": null, "child": null})).unwrap_err();
        let paths: Vec<&str> = failure.violations().iter().map(|v| v.path.as_str()).collect();
        assert_eq!(paths, vec!["labels", "child"]);
        assert!(failure.violations().iter().all(|v| v.actual == "null"));
    }

    #[test]
    fn test_collects_all_violations_in_order() {
        let input = json!({
            "enabled": "yes",
            "entries": [{"name": "a"}, {"value": 3}, "oops"],
            "labels": {"b": 1, "a": "ok", "c": false}
        });
        let failure = validate(&parent_schema(), &input).unwrap_err();
        let found: Vec<(&str, ViolationKind)> = failure
            .violations()
            .iter()
            .map(|v| (v.path.as_str(), v.kind))
            .collect();
        assert_eq!(
            found,
            vec![
                ("id", ViolationKind::Missing),
                ("enabled", ViolationKind::TypeMismatch),
                ("entries.1.name", ViolationKind::Missing),
                ("entries.1.value", ViolationKind::TypeMismatch),
                ("entries.2", ViolationKind::TypeMismatch),
                ("labels.b", ViolationKind::TypeMismatch),
                ("labels.c", ViolationKind::TypeMismatch),
            ]
        );
        assert_eq!(failure.at("entries.2").unwrap().expected, "record Entry");
    }

    #[test]
    fn test_nested_optional_record_validated() {
        let record = validate(&parent_schema(), &json!({"id": 1, "child": {"name": "c"}})).unwrap();
        let child = record.get("child").and_then(NormalizedValue::as_record).unwrap();
        assert_eq!(child.get_str("value"), Some(""));

        let failure = validate(&parent_schema(), &json!({"id": 1, "child": {}})).unwrap_err();
        assert_eq!(failure.violations()[0].path, "child.name");
    }

    #[test]
    fn test_input_not_mutated_or_shared() {
        let input = json!({"id": 1, "labels": {"k": "v"}});
        let mut record = validate(&parent_schema(), &input).unwrap();
        if let Some(NormalizedValue::Mapping(m)) = record.get_mut("labels") {
            m.clear();
        }
        assert_eq!(input["labels"]["k"], "v");
    }
}
