//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Shortest sweep interval accepted from configuration.
const MIN_SWEEP_INTERVAL_SECS: u64 = 5 * 60;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `table_name` is not a plain SQL identifier
    /// - `sweep_interval_secs` is under 5 minutes
    /// - `busy_timeout_ms` exceeds 5 minutes
    /// - `default_sliding_expiration_secs` is 0
    ///
    /// Returns `ConfigError::Missing` if `db_path` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Missing {
                field: "db_path".into(),
                hint: "Set SQLCACHE_DB_PATH environment variable".into(),
            });
        }

        validate_table_name(&self.table_name)?;

        if self.sweep_interval_secs < MIN_SWEEP_INTERVAL_SECS {
            return Err(ConfigError::Invalid {
                field: "sweep_interval_secs".into(),
                reason: format!("must be at least {MIN_SWEEP_INTERVAL_SECS}s"),
            });
        }

        if self.busy_timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "busy_timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.default_sliding_expiration_secs == Some(0) {
            return Err(ConfigError::Invalid {
                field: "default_sliding_expiration_secs".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if self.busy_timeout_ms == 0 {
            tracing::warn!("busy_timeout_ms is 0; concurrent writers will fail immediately on a locked database");
        }

        Ok(())
    }
}

/// Check that a table name is safe to interpolate into SQL.
///
/// Accepts ASCII letters, digits and underscores, not starting with a digit,
/// at most 64 characters, and outside SQLite's reserved `sqlite_` namespace.
pub fn validate_table_name(name: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid { field: "table_name".into(), reason: reason.into() };

    let Some(first) = name.chars().next() else {
        return Err(invalid("must not be empty"));
    };
    if name.len() > 64 {
        return Err(invalid("must not exceed 64 characters"));
    }
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(invalid("must start with a letter or underscore"));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid("must contain only ASCII letters, digits and underscores"));
    }
    if name.to_ascii_lowercase().starts_with("sqlite_") {
        return Err(invalid("the sqlite_ prefix is reserved"));
    }
    Ok(())
}
