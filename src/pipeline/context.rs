//! Pipeline context management.
//!
//! Provides batch context for logging and result correlation.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::ValidatorConfig;
use crate::logging::structured::LogContext;

/// Context for one batch of raw payloads validated against one schema.
#[derive(Debug, Clone)]
pub struct BatchContext {
    pub batch_id: String,
    pub schema_name: String,
    pub received_at: DateTime<Utc>,
    pub config: ValidatorConfig,
}

impl BatchContext {
    /// `received_at` is RFC 3339; missing or unparsable values fall back to now.
    pub fn new(schema_name: &str, received_at: Option<&str>, config: ValidatorConfig) -> Self {
        let batch_id = format!("batch-{}", &Uuid::new_v4().simple().to_string()[..8]);

        let received_at = received_at
            .and_then(|ts| {
                DateTime::parse_from_rfc3339(ts)
                    .map(|dt| dt.with_timezone(&Utc))
                    .ok()
            })
            .unwrap_or_else(Utc::now);

        Self {
            batch_id,
            schema_name: schema_name.to_string(),
            received_at,
            config,
        }
    }

    pub fn log_context(&self) -> LogContext {
        LogContext::new(&self.batch_id)
    }

    /// Log context for the record at `index` in this batch.
    pub fn record_context(&self, index: usize) -> LogContext {
        self.log_context().with_record(index)
    }
}
