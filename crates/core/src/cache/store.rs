//! Async cache store.
//!
//! Wraps a tokio-rusqlite Connection that runs statements on a background
//! thread. Every operation is one `call` on that connection; the store itself
//! keeps no mutable state between calls.

use std::path::Path;
use std::sync::Arc;

use tokio_rusqlite::Connection;

use super::entry::{CacheEntry, RefreshOutcome, SetOutcome, validate_key};
use super::expiration;
use super::migrations;
use super::options::EntryOptions;
use super::statements::{self, EntryRow};
use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::Error;

/// Cache store handle.
///
/// Cheap to clone; clones share the underlying connection.
#[derive(Clone, Debug)]
pub struct CacheStore {
    pub(crate) conn: Connection,
    config: Arc<StoreConfig>,
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    /// Open a store on the database at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies pragmas, and runs any
    /// pending migrations for the configured table.
    pub async fn open(path: impl AsRef<Path>, config: StoreConfig) -> Result<Self, Error> {
        config.validate()?;
        let conn = Connection::open(path)
            .await
            .map_err(|e| Error::StoreUnavailable(e.into()))?;
        Self::init(conn, config).await
    }

    /// Open a store on an in-memory database for testing.
    pub async fn open_in_memory(config: StoreConfig) -> Result<Self, Error> {
        config.validate()?;
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::StoreUnavailable(e.into()))?;
        Self::init(conn, config).await
    }

    async fn init(conn: Connection, config: StoreConfig) -> Result<Self, Error> {
        let busy_timeout = config.busy_timeout;
        conn.call(move |conn| -> Result<(), Error> {
            conn.execute_batch(
                "PRAGMA journal_mode=WAL;
                 PRAGMA synchronous=NORMAL;
                 PRAGMA temp_store=MEMORY;",
            )?;
            conn.busy_timeout(busy_timeout)?;
            Ok(())
        })
        .await
        .map_err(Error::from)?;

        migrations::run(&conn, &config.table_name).await?;

        tracing::debug!(table = %config.table_name, "Cache store ready");

        Ok(Self { conn, config: Arc::new(config), clock: Arc::new(SystemClock) })
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Write `value` under `key`, replacing any existing entry.
    ///
    /// Validation happens before any statement is issued. A duplicate-key race
    /// with another writer is success (`SetOutcome::ConflictResolved`).
    pub async fn set(&self, key: &str, value: &[u8], options: EntryOptions) -> Result<SetOutcome, Error> {
        validate_key(key)?;
        let options = self.config.apply_defaults(options);
        let resolved = expiration::resolve(&options, self.clock.now())?;
        let row = EntryRow::new(key, value, &resolved);

        let table = self.config.table_name.clone();
        let outcome = self
            .conn
            .call(move |conn| -> Result<SetOutcome, Error> { statements::upsert(conn, &table, &row) })
            .await
            .map_err(Error::from)?;

        match outcome {
            SetOutcome::Written => tracing::debug!(key, expires_at = %resolved.expires_at, "Cache entry written"),
            SetOutcome::ConflictResolved => {
                tracing::warn!(key, "Concurrent insert won the race; keeping the existing entry")
            }
        }
        Ok(outcome)
    }

    /// Get the value stored under `key`.
    ///
    /// Returns None if there is no live entry. Does not extend the expiry.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        let entry = self.get_entry(key, true).await?;
        Ok(entry.map(|e| e.value.unwrap_or_default()))
    }

    /// Get the entry stored under `key`, optionally without its value.
    pub async fn get_entry(&self, key: &str, include_value: bool) -> Result<Option<CacheEntry>, Error> {
        validate_key(key)?;
        let key = key.to_string();
        let table = self.config.table_name.clone();
        let now = self.clock.now();
        let entry = self
            .conn
            .call(move |conn| -> Result<Option<CacheEntry>, Error> {
                statements::select(conn, &table, &key, now, include_value)
            })
            .await
            .map_err(Error::from)?;

        tracing::debug!(hit = entry.is_some(), include_value, "Cache lookup");
        Ok(entry)
    }

    /// Re-apply the sliding window of the entry under `key`.
    ///
    /// A missing entry, or one removed mid-refresh, is `RefreshOutcome::Missing`.
    pub async fn refresh(&self, key: &str) -> Result<RefreshOutcome, Error> {
        validate_key(key)?;
        let owned_key = key.to_string();
        let table = self.config.table_name.clone();
        let now = self.clock.now();
        let outcome = self
            .conn
            .call(move |conn| -> Result<RefreshOutcome, Error> { statements::refresh(conn, &table, &owned_key, now) })
            .await
            .map_err(Error::from)?;

        tracing::debug!(key, ?outcome, "Cache entry refreshed");
        Ok(outcome)
    }

    /// Remove the entry under `key`. Returns whether a row was removed.
    pub async fn delete(&self, key: &str) -> Result<bool, Error> {
        validate_key(key)?;
        let owned_key = key.to_string();
        let table = self.config.table_name.clone();
        let deleted = self
            .conn
            .call(move |conn| -> Result<bool, Error> { statements::delete(conn, &table, &owned_key) })
            .await
            .map_err(Error::from)?;

        tracing::debug!(key, deleted, "Cache entry deleted");
        Ok(deleted)
    }

    /// Delete every entry whose expiry is at or before now.
    ///
    /// Returns the number of deleted entries. Failures are returned, never
    /// swallowed.
    pub async fn run_expiration_sweep(&self) -> Result<u64, Error> {
        let table = self.config.table_name.clone();
        let now = self.clock.now();
        let deleted = self
            .conn
            .call(move |conn| -> Result<u64, Error> { statements::sweep(conn, &table, now) })
            .await
            .map_err(Error::from)?;

        tracing::info!(table = %self.config.table_name, deleted, "Expiration sweep finished");
        Ok(deleted)
    }
}
