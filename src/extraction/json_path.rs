//! Dotted path handling.
//!
//! Paths like `datastore.metadata.0.name` are used both in violation reports
//! and to look values up again in raw or normalized records. Array elements
//! are addressed by index, mapping entries by key. A key that cannot be
//! written as a plain segment (empty, or containing `.`, `[`, `]`, `"` or
//! `\`) is written as a quoted bracket segment: `variables["db.host"]`.

use serde_json::Value;

use crate::validation::normalized::{NormalizedRecord, NormalizedValue};

/// Longest rendering of an offending value in a violation.
pub const MAX_RENDERED_LEN: usize = 64;

/// Append one segment to a path, quoting it when needed.
pub fn join_path(parent: &str, segment: &str) -> String {
    if needs_quoting(segment) {
        format!("{}[{}]", parent, Value::String(segment.to_string()))
    } else if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", parent, segment)
    }
}

fn needs_quoting(segment: &str) -> bool {
    segment.is_empty() || segment.contains(|c: char| matches!(c, '.' | '[' | ']' | '"' | '\\'))
}

/// Split a path built by [`join_path`] back into its raw segments.
///
/// The empty path has no segments. Returns `None` for a path `join_path`
/// could not have produced.
pub fn split_path(path: &str) -> Option<Vec<String>> {
    let mut segments = Vec::new();
    let mut rest = path;

    while !rest.is_empty() {
        if let Some(quoted) = rest.strip_prefix('[') {
            let mut stream = serde_json::Deserializer::from_str(quoted).into_iter::<String>();
            let key = stream.next()?.ok()?;
            rest = quoted[stream.byte_offset()..].strip_prefix(']')?;
            segments.push(key);
        } else {
            let end = rest.find(|c: char| c == '.' || c == '[').unwrap_or(rest.len());
            if end == 0 {
                return None;
            }
            segments.push(rest[..end].to_string());
            rest = &rest[end..];
        }

        if let Some(next) = rest.strip_prefix('.') {
            if next.is_empty() {
                return None;
            }
            rest = next;
        } else if !rest.is_empty() && !rest.starts_with('[') {
            return None;
        }
    }
    Some(segments)
}

/// Resolve a path to a value in JSON.
///
/// # Examples
/// ```
/// use datastore_schema::extraction::resolve_json_path;
/// use serde_json::json;
/// let data = json!({"datastore": {"metadata": [{"name": "region"}]}});
/// let value = resolve_json_path(&data, "datastore.metadata.0.name");
/// assert_eq!(value, Some(&json!("region")));
/// ```
pub fn resolve_json_path<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    split_path(path)?
        .iter()
        .try_fold(data, |current, part| match current {
            Value::Object(obj) => obj.get(part),
            Value::Array(arr) => arr.get(part.parse::<usize>().ok()?),
            _ => None,
        })
}

/// Same as [`resolve_json_path`], over a normalized record.
pub fn resolve_normalized<'a>(record: &'a NormalizedRecord, path: &str) -> Option<&'a NormalizedValue> {
    let segments = split_path(path)?;
    let (first, rest) = segments.split_first()?;
    rest.iter()
        .try_fold(record.get(first)?, |current, part| match current {
            NormalizedValue::Record(r) => r.get(part),
            NormalizedValue::Sequence(items) => items.get(part.parse::<usize>().ok()?),
            NormalizedValue::Mapping(m) => m.get(part),
            _ => None,
        })
}

/// JSON type name of a raw value.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Compact JSON rendering of a value for violation reports, truncated to
/// [`MAX_RENDERED_LEN`] characters.
pub fn render_value(value: &Value) -> String {
    let rendered = value.to_string();
    if rendered.chars().count() <= MAX_RENDERED_LEN {
        return rendered;
    }
    let mut truncated: String = rendered.chars().take(MAX_RENDERED_LEN).collect();
    truncated.push_str("...");
    truncated
}
