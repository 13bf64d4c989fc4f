//! Structured logging utilities.
//!
//! Every pipeline log line starts with the batch id and, once known, the
//! index of the record inside that batch.

use std::fmt;

/// Logging context for a batch of records.
#[derive(Debug, Clone)]
pub struct LogContext {
    pub batch_id: String,
    pub record_index: Option<usize>,
}

impl LogContext {
    pub fn new(batch_id: &str) -> Self {
        Self {
            batch_id: batch_id.to_string(),
            record_index: None,
        }
    }

    pub fn with_record(&self, index: usize) -> Self {
        Self {
            batch_id: self.batch_id.clone(),
            record_index: Some(index),
        }
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.record_index {
            Some(index) => write!(f, "[batch={}] [record={}]", self.batch_id, index),
            None => write!(f, "[batch={}]", self.batch_id),
        }
    }
}

/// Log an info message with context.
#[macro_export]
macro_rules! log_info {
    ($ctx:expr, $event:expr, $($key:ident = $value:expr),* $(,)?) => {
        log::info!(
            "{} {} {}",
            $ctx,
            $event,
            format_args!(concat!($(stringify!($key), "={:?} "),*), $($value),*)
        );
    };
}

/// Log a warning message with context.
#[macro_export]
macro_rules! log_warn {
    ($ctx:expr, $event:expr, $($key:ident = $value:expr),* $(,)?) => {
        log::warn!(
            "{} {} {}",
            $ctx,
            $event,
            format_args!(concat!($(stringify!($key), "={:?} "),*), $($value),*)
        );
    };
}

/// Log a debug message with context.
#[macro_export]
macro_rules! log_debug {
    ($ctx:expr, $event:expr, $($key:ident = $value:expr),* $(,)?) => {
        log::debug!(
            "{} {} {}",
            $ctx,
            $event,
            format_args!(concat!($(stringify!($key), "={:?} "),*), $($value),*)
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_context_display() {
        let ctx = LogContext::new("batch-123");
        assert_eq!(format!("{}", ctx), "[batch=batch-123]");

        let ctx_with_record = ctx.with_record(4);
        assert_eq!(
            format!("{}", ctx_with_record),
            "[batch=batch-123] [record=4]"
        );
    }

    #[test]
    fn test_macros_expand() {
        let ctx = LogContext::new("batch-1").with_record(0);
        crate::log_info!(ctx, "RECORD_ACCEPTED", schema = "Datastore");
        crate::log_warn!(ctx, "RECORD_REJECTED", reason = "invalid", violations = 2);
        crate::log_debug!(ctx, "RECORD_START", bytes = 10);
    }
}
