//! Blocking cache store.
//!
//! Same protocol as [`CacheStore`](super::CacheStore) for callers without an
//! async runtime. Each operation opens its own connection and closes it when
//! the operation returns, on success or failure.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio_rusqlite::rusqlite::Connection;

use super::entry::{CacheEntry, RefreshOutcome, SetOutcome, validate_key};
use super::expiration;
use super::migrations;
use super::options::EntryOptions;
use super::statements::{self, EntryRow};
use crate::Error;
use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;

/// Blocking cache store bound to a database file.
#[derive(Clone, Debug)]
pub struct BlockingCacheStore {
    path: PathBuf,
    config: Arc<StoreConfig>,
    clock: Arc<dyn Clock>,
}

impl BlockingCacheStore {
    /// Open a store on the database at `path`, creating the file and table if needed.
    pub fn open(path: impl AsRef<Path>, config: StoreConfig) -> Result<Self, Error> {
        config.validate()?;
        let store = Self { path: path.as_ref().to_path_buf(), config: Arc::new(config), clock: Arc::new(SystemClock) };

        store.with_connection(|conn| {
            conn.pragma_update(None, "journal_mode", "WAL")?;
            migrations::apply(conn, &store.config.table_name)
        })?;

        tracing::debug!(path = %store.path.display(), table = %store.config.table_name, "Blocking cache store ready");
        Ok(store)
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn with_connection<T>(&self, op: impl FnOnce(&Connection) -> Result<T, Error>) -> Result<T, Error> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(self.config.busy_timeout)?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        op(&conn)
    }

    fn table(&self) -> &str {
        &self.config.table_name
    }

    /// Write `value` under `key`, replacing any existing entry.
    pub fn set(&self, key: &str, value: &[u8], options: EntryOptions) -> Result<SetOutcome, Error> {
        validate_key(key)?;
        let options = self.config.apply_defaults(options);
        let resolved = expiration::resolve(&options, self.clock.now())?;
        let row = EntryRow::new(key, value, &resolved);

        let outcome = self.with_connection(|conn| statements::upsert(conn, self.table(), &row))?;
        if outcome == SetOutcome::ConflictResolved {
            tracing::warn!(key, "Concurrent insert won the race; keeping the existing entry");
        }
        Ok(outcome)
    }

    /// Get the value stored under `key`, if live. Does not extend the expiry.
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        let entry = self.get_entry(key, true)?;
        Ok(entry.map(|e| e.value.unwrap_or_default()))
    }

    pub fn get_entry(&self, key: &str, include_value: bool) -> Result<Option<CacheEntry>, Error> {
        validate_key(key)?;
        let now = self.clock.now();
        self.with_connection(|conn| statements::select(conn, self.table(), key, now, include_value))
    }

    pub fn refresh(&self, key: &str) -> Result<RefreshOutcome, Error> {
        validate_key(key)?;
        let now = self.clock.now();
        self.with_connection(|conn| statements::refresh(conn, self.table(), key, now))
    }

    pub fn delete(&self, key: &str) -> Result<bool, Error> {
        validate_key(key)?;
        self.with_connection(|conn| statements::delete(conn, self.table(), key))
    }

    /// Delete every entry whose expiry is at or before now.
    pub fn run_expiration_sweep(&self) -> Result<u64, Error> {
        let now = self.clock.now();
        let deleted = self.with_connection(|conn| statements::sweep(conn, self.table(), now))?;
        tracing::info!(table = %self.table(), deleted, "Expiration sweep finished");
        Ok(deleted)
    }
}
