//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SQLCACHE_*)
//! 2. TOML config file (if SQLCACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::EntryOptions;

mod validation;

pub use validation::{ConfigError, validate_table_name};

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SQLCACHE_*)
/// 2. TOML config file (if SQLCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite database holding the cache table.
    ///
    /// Set via SQLCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Name of the cache entry table.
    ///
    /// Set via SQLCACHE_TABLE_NAME environment variable.
    #[serde(default = "default_table_name")]
    pub table_name: String,

    /// Seconds between expiration sweeps.
    ///
    /// Set via SQLCACHE_SWEEP_INTERVAL_SECS environment variable.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// How long a statement waits on a locked database before failing.
    ///
    /// Set via SQLCACHE_BUSY_TIMEOUT_MS environment variable.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Sliding window applied to writes that carry no expiration at all.
    ///
    /// Set via SQLCACHE_DEFAULT_SLIDING_EXPIRATION_SECS environment variable.
    /// When unset such writes fail with `MissingExpiration`.
    #[serde(default)]
    pub default_sliding_expiration_secs: Option<u64>,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./sqlcache.sqlite")
}

fn default_table_name() -> String {
    "cache_entries".into()
}

fn default_sweep_interval_secs() -> u64 {
    1800 // 30 minutes
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            table_name: default_table_name(),
            sweep_interval_secs: default_sweep_interval_secs(),
            busy_timeout_ms: default_busy_timeout_ms(),
            default_sliding_expiration_secs: None,
        }
    }
}

impl AppConfig {
    /// Sweep interval as Duration for use with tokio timers.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SQLCACHE_`
    /// 2. TOML file from `SQLCACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SQLCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SQLCACHE_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// The immutable settings handed to a cache store at construction.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            table_name: self.table_name.clone(),
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
            default_sliding_expiration: self.default_sliding_expiration_secs.map(Duration::from_secs),
        }
    }
}

/// Settings a cache store is constructed with.
///
/// Stores never consult process-wide state; everything they need is here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub table_name: String,
    pub busy_timeout: Duration,
    pub default_sliding_expiration: Option<Duration>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        AppConfig::default().store_config()
    }
}

impl StoreConfig {
    /// Check the settings that end up interpolated into SQL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the table name is not a plain identifier
    /// or the default sliding expiration is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_table_name(&self.table_name)?;
        if self.default_sliding_expiration.is_some_and(|d| d.as_micros() == 0) {
            return Err(ConfigError::Invalid {
                field: "default_sliding_expiration".into(),
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }

    /// Give options without any expiration the default sliding window, if one is configured.
    pub(crate) fn apply_defaults(&self, options: EntryOptions) -> EntryOptions {
        match self.default_sliding_expiration {
            Some(sliding) if !options.has_expiration() => options.with_sliding(sliding),
            _ => options,
        }
    }
}
