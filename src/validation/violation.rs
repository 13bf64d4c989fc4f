//! Field-level violations and the aggregate validation failure.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rendering used for the actual value of a missing field.
pub const MISSING: &str = "missing";

/// Kind of a single violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    Missing,
    TypeMismatch,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::Missing => "missing",
            ViolationKind::TypeMismatch => "type-mismatch",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Dotted path, e.g. `datastore.metadata.0.name`. Empty for the root.
    pub path: String,
    pub kind: ViolationKind,
    /// Name of the declared kind, e.g. `integer` or `sequence<string>`.
    pub expected: String,
    /// `missing`, or the compact JSON of the offending value.
    pub actual: String,
}

impl Violation {
    pub fn missing(path: &str, expected: String) -> Self {
        Self {
            path: path.to_string(),
            kind: ViolationKind::Missing,
            expected,
            actual: MISSING.to_string(),
        }
    }

    pub fn type_mismatch(path: &str, expected: String, actual: String) -> Self {
        Self {
            path: path.to_string(),
            kind: ViolationKind::TypeMismatch,
            expected,
            actual,
        }
    }

    /// Path as shown in messages.
    pub fn display_path(&self) -> &str {
        if self.path.is_empty() {
            "<root>"
        } else {
            &self.path
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} (expected {}, got {})",
            self.display_path(),
            self.kind,
            self.expected,
            self.actual
        )
    }
}

/// Every violation found in one validation pass, in traversal order.
///
/// Never empty.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FailureRepr")]
#[error("validation failed for {schema}: {}", join_violations(.violations))]
pub struct ValidationFailure {
    schema: String,
    violations: Vec<Violation>,
}

#[derive(Deserialize)]
struct FailureRepr {
    schema: String,
    violations: Vec<Violation>,
}

impl TryFrom<FailureRepr> for ValidationFailure {
    type Error = String;

    fn try_from(repr: FailureRepr) -> Result<Self, Self::Error> {
        let FailureRepr { schema, violations } = repr;
        ValidationFailure::new(&schema, violations)
            .ok_or_else(|| format!("validation failure for {} has no violations", schema))
    }
}

impl ValidationFailure {
    /// Returns `None` when there is nothing to report.
    pub fn new(schema: &str, violations: Vec<Violation>) -> Option<Self> {
        if violations.is_empty() {
            return None;
        }
        Some(Self {
            schema: schema.to_string(),
            violations,
        })
    }

    pub(crate) fn single(schema: &str, violation: Violation) -> Self {
        Self {
            schema: schema.to_string(),
            violations: vec![violation],
        }
    }

    /// Name of the schema the input was validated against.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    /// First violation recorded at `path`, if any.
    pub fn at(&self, path: &str) -> Option<&Violation> {
        self.violations.iter().find(|v| v.path == path)
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
