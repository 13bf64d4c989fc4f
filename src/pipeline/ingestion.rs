//! Batch validation of raw payloads.
//!
//! The network layer hands over JSON text exactly as received. Each payload
//! goes through:
//! 1. Schema lookup (an unknown schema rejects every payload)
//! 2. Size check
//! 3. JSON parsing
//! 4. Schema validation and normalization
//!
//! Rejections carry a SHA-256 of the raw payload so they can be correlated
//! with upstream logs without storing the payload itself.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::logging::structured::LogContext;
use crate::validation::normalized::NormalizedRecord;
use crate::validation::registry::{lookup_schema, SchemaRegistry};
use crate::validation::schema::RecordSchema;
use crate::validation::validator::validate;
use crate::validation::violation::Violation;

use super::context::BatchContext;

/// Why a payload was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    Oversized,
    Malformed,
    UnknownSchema,
    Invalid,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionReason::Oversized => "oversized",
            RejectionReason::Malformed => "malformed",
            RejectionReason::UnknownSchema => "unknown_schema",
            RejectionReason::Invalid => "invalid",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordOutcome {
    Accepted {
        record: NormalizedRecord,
    },
    Rejected {
        reason: RejectionReason,
        detail: String,
        content_hash: String,
        violations: Vec<Violation>,
    },
}

/// Result of processing a single payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordResult {
    pub index: usize,
    #[serde(flatten)]
    pub outcome: RecordOutcome,
}

impl RecordResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self.outcome, RecordOutcome::Accepted { .. })
    }

    pub fn record(&self) -> Option<&NormalizedRecord> {
        match &self.outcome {
            RecordOutcome::Accepted { record } => Some(record),
            RecordOutcome::Rejected { .. } => None,
        }
    }

    pub fn rejection_reason(&self) -> Option<RejectionReason> {
        match &self.outcome {
            RecordOutcome::Rejected { reason, .. } => Some(*reason),
            RecordOutcome::Accepted { .. } => None,
        }
    }

    pub fn violations(&self) -> &[Violation] {
        match &self.outcome {
            RecordOutcome::Rejected { violations, .. } => violations,
            RecordOutcome::Accepted { .. } => &[],
        }
    }
}

/// Result of processing a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    pub batch_id: String,
    pub schema_name: String,
    pub received_at: DateTime<Utc>,
    pub received_count: usize,
    pub accepted_count: usize,
    pub rejected_count: usize,
    pub records: Vec<RecordResult>,
}

impl BatchResult {
    /// Normalized records of the accepted payloads, in input order.
    pub fn accepted(&self) -> impl Iterator<Item = &NormalizedRecord> {
        self.records.iter().filter_map(RecordResult::record)
    }

    pub fn rejected(&self) -> impl Iterator<Item = &RecordResult> {
        self.records.iter().filter(|r| !r.is_accepted())
    }
}

/// Process a batch against a schema from the process-wide registry.
pub fn process_batch(ctx: &BatchContext, payloads: &[String]) -> BatchResult {
    let schema = lookup_schema(&ctx.schema_name);
    run_batch(ctx, schema, payloads)
}

/// Process a batch against a schema from `registry`.
pub fn process_batch_with(registry: &SchemaRegistry, ctx: &BatchContext, payloads: &[String]) -> BatchResult {
    run_batch(ctx, registry.get(&ctx.schema_name), payloads)
}

fn run_batch(ctx: &BatchContext, schema: Option<Arc<RecordSchema>>, payloads: &[String]) -> BatchResult {
    let log_ctx = ctx.log_context();

    crate::log_info!(
        log_ctx,
        "BATCH_RECEIVED",
        schema = ctx.schema_name,
        payloads = payloads.len(),
    );

    if schema.is_none() {
        crate::log_warn!(log_ctx, "SCHEMA_UNKNOWN", schema = ctx.schema_name);
    }

    let mut records = Vec::with_capacity(payloads.len());
    let mut accepted = 0;
    let mut rejected = 0;

    for (index, payload) in payloads.iter().enumerate() {
        let result = process_single_payload(ctx, schema.as_deref(), index, payload);

        if result.is_accepted() {
            accepted += 1;
        } else {
            rejected += 1;
        }

        records.push(result);
    }

    crate::log_info!(
        log_ctx,
        "BATCH_COMPLETE",
        received = payloads.len(),
        accepted = accepted,
        rejected = rejected,
    );

    BatchResult {
        batch_id: ctx.batch_id.clone(),
        schema_name: ctx.schema_name.clone(),
        received_at: ctx.received_at,
        received_count: payloads.len(),
        accepted_count: accepted,
        rejected_count: rejected,
        records,
    }
}

fn process_single_payload(
    ctx: &BatchContext,
    schema: Option<&RecordSchema>,
    index: usize,
    payload: &str,
) -> RecordResult {
    let log_ctx = ctx.record_context(index);

    crate::log_debug!(log_ctx, "RECORD_START", bytes = payload.len());

    // [1] SCHEMA
    let schema = match schema {
        Some(schema) => schema,
        None => {
            return reject(
                &log_ctx,
                index,
                payload,
                RejectionReason::UnknownSchema,
                format!("no schema named {}", ctx.schema_name),
                Vec::new(),
            );
        }
    };

    // [2] SIZE CHECK
    if payload.len() > ctx.config.max_payload_bytes {
        return reject(
            &log_ctx,
            index,
            payload,
            RejectionReason::Oversized,
            format!(
                "payload is {} bytes, limit {}",
                payload.len(),
                ctx.config.max_payload_bytes
            ),
            Vec::new(),
        );
    }

    // [3] PARSE
    let input: Value = match serde_json::from_str(payload) {
        Ok(v) => v,
        Err(e) => {
            return reject(
                &log_ctx,
                index,
                payload,
                RejectionReason::Malformed,
                format!("JSON parse error: {}", e),
                Vec::new(),
            );
        }
    };

    // [4] VALIDATE
    match validate(schema, &input) {
        Ok(record) => {
            crate::log_debug!(log_ctx, "RECORD_ACCEPTED", schema = schema.name());
            RecordResult {
                index,
                outcome: RecordOutcome::Accepted { record },
            }
        }
        Err(failure) => {
            let detail = failure.to_string();
            reject(
                &log_ctx,
                index,
                payload,
                RejectionReason::Invalid,
                detail,
                failure.into_violations(),
            )
        }
    }
}

fn reject(
    log_ctx: &LogContext,
    index: usize,
    payload: &str,
    reason: RejectionReason,
    detail: String,
    violations: Vec<Violation>,
) -> RecordResult {
    let content_hash = compute_hash(payload);

    crate::log_warn!(
        log_ctx,
        "RECORD_REJECTED",
        reason = reason.as_str(),
        violations = violations.len(),
        content_hash = &content_hash[..16],
    );

    RecordResult {
        index,
        outcome: RecordOutcome::Rejected {
            reason,
            detail,
            content_hash,
            violations,
        },
    }
}

/// Compute SHA256 hash of content.
pub fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidatorConfig;

    fn ctx(schema: &str) -> BatchContext {
        BatchContext::new(schema, Some("2026-01-29T00:00:00Z"), ValidatorConfig::default())
    }

    #[test]
    fn test_compute_hash() {
        let hash = compute_hash("test content");
        assert_eq!(hash.len(), 64); // SHA256 produces 64 hex chars
        assert_eq!(hash, compute_hash("test content"));
        assert_ne!(hash, compute_hash("test content "));
    }

    #[test]
    fn test_process_invalid_json() {
        let ctx = ctx("Datastore");
        let result = process_single_payload(&ctx, lookup_schema("Datastore").as_deref(), 0, "invalid json{");
        assert!(!result.is_accepted());
        assert_eq!(result.rejection_reason(), Some(RejectionReason::Malformed));
    }

    #[test]
    fn test_oversized_payload() {
        let ctx = BatchContext::new(
            "Datastore",
            None,
            ValidatorConfig::default().with_max_payload_bytes(16),
        );
        let payload = r#"{"name": "db1", "type": "postgres"}"#;
        let result = process_single_payload(&ctx, lookup_schema("Datastore").as_deref(), 0, payload);
        assert_eq!(result.rejection_reason(), Some(RejectionReason::Oversized));
        match &result.outcome {
            RecordOutcome::Rejected { content_hash, .. } => assert_eq!(content_hash, &compute_hash(payload)),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_batch_counts() {
        let payloads = vec![
            r#"{"name": "db1", "type": "postgres"}"#.to_string(),
            r#"{"type": "postgres"}"#.to_string(),
            "[".to_string(),
        ];
        let result = process_batch(&ctx("Datastore"), &payloads);

        assert_eq!(result.received_count, 3);
        assert_eq!(result.accepted_count, 1);
        assert_eq!(result.rejected_count, 2);
        assert_eq!(result.accepted().next().unwrap().get_str("status"), Some(""));

        let reasons: Vec<_> = result.rejected().map(|r| (r.index, r.rejection_reason())).collect();
        assert_eq!(
            reasons,
            vec![
                (1, Some(RejectionReason::Invalid)),
                (2, Some(RejectionReason::Malformed)),
            ]
        );
        assert_eq!(result.records[1].violations()[0].path, "name");
    }

    #[test]
    fn test_unknown_schema_rejects_everything() {
        let payloads = vec!["{}".to_string(), "not json{".to_string(), "x".repeat(64)];
        let ctx = BatchContext::new(
            "Datastore",
            None,
            ValidatorConfig::default().with_max_payload_bytes(32),
        );
        let result = process_batch_with(&SchemaRegistry::new(), &ctx, &payloads);
        assert_eq!(result.rejected_count, 3);
        assert!(result
            .records
            .iter()
            .all(|r| r.rejection_reason() == Some(RejectionReason::UnknownSchema)));
    }

    #[test]
    fn test_batch_result_serializes() {
        let payloads = vec![
            r#"{"cloud_provider_id": "a", "project_id": 1}"#.to_string(),
            r#"{"cloud_provider_id": "b"}"#.to_string(),
        ];
        let result = process_batch(&ctx("CloudProvider"), &payloads);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["records"][0]["status"], "accepted");
        assert_eq!(json["records"][0]["record"]["project_id"], 1);
        assert_eq!(json["records"][1]["status"], "rejected");
        assert_eq!(json["records"][1]["reason"], "invalid");
        assert_eq!(json["records"][1]["violations"][0]["kind"], "missing");
        assert_eq!(json["received_at"], "2026-01-29T00:00:00Z");
    }
}
