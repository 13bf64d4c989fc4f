//! Runtime configuration.
//!
//! Defaults, optionally overridden from the environment:
//! - `DATASTORE_SCHEMA_MAX_PAYLOAD_BYTES` - largest raw payload the pipeline
//!   will parse
//! - `DATASTORE_SCHEMA_LOG` - log level (`error`, `warn`, `info`, `debug`,
//!   `trace`, `off`)

use std::str::FromStr;

use log::LevelFilter;

/// 10MB per payload
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 10_000_000;

pub const ENV_MAX_PAYLOAD_BYTES: &str = "DATASTORE_SCHEMA_MAX_PAYLOAD_BYTES";
pub const ENV_LOG_LEVEL: &str = "DATASTORE_SCHEMA_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    pub max_payload_bytes: usize,
    pub log_level: LevelFilter,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            log_level: LevelFilter::Info,
        }
    }
}

impl ValidatorConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by `lookup`. Unparsable values keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_MAX_PAYLOAD_BYTES) {
            match raw.trim().parse::<usize>() {
                Ok(bytes) if bytes > 0 => config.max_payload_bytes = bytes,
                _ => log::warn!(
                    "CONFIG_INVALID key={} value={:?} using={}",
                    ENV_MAX_PAYLOAD_BYTES,
                    raw,
                    config.max_payload_bytes
                ),
            }
        }

        if let Some(raw) = lookup(ENV_LOG_LEVEL) {
            match LevelFilter::from_str(raw.trim()) {
                Ok(level) => config.log_level = level,
                Err(_) => log::warn!(
                    "CONFIG_INVALID key={} value={:?} using={}",
                    ENV_LOG_LEVEL,
                    raw,
                    config.log_level
                ),
            }
        }

        config
    }

    pub fn with_max_payload_bytes(mut self, bytes: usize) -> Self {
        self.max_payload_bytes = bytes;
        self
    }
}
