//! The statements behind every cache operation.
//!
//! Each function issues parameterized statements on a borrowed connection and
//! never opens a transaction; the async and blocking stores both call in here
//! so the two conventions share one protocol. The table name is validated
//! to `[A-Za-z0-9_]` and always written as a quoted identifier, so names that
//! collide with SQL keywords still work.

use chrono::{DateTime, Utc};
use tokio_rusqlite::rusqlite::{self, Connection, ErrorCode, OptionalExtension, ffi, params};

use super::entry::{CacheEntry, RefreshOutcome, SetOutcome};
use super::expiration::{self, ResolvedExpiration, decode_sliding, decode_timestamp, encode_sliding, encode_timestamp};
use crate::Error;

/// A fully resolved row ready to be written.
#[derive(Debug, Clone)]
pub(crate) struct EntryRow {
    pub key: String,
    pub value: Vec<u8>,
    pub expires_at: String,
    pub absolute_expiration: Option<String>,
    pub sliding_expiration_us: Option<i64>,
}

impl EntryRow {
    pub fn new(key: &str, value: &[u8], resolved: &ResolvedExpiration) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_vec(),
            expires_at: encode_timestamp(resolved.expires_at),
            absolute_expiration: resolved.absolute_expiration.map(encode_timestamp),
            sliding_expiration_us: resolved.sliding_expiration.map(encode_sliding),
        }
    }
}

/// Row as stored, before timestamps are decoded.
struct StoredRow {
    key: String,
    value: Option<Vec<u8>>,
    expires_at: String,
    absolute_expiration: Option<String>,
    sliding_expiration_us: Option<i64>,
}

impl StoredRow {
    fn decode(self) -> Result<CacheEntry, Error> {
        Ok(CacheEntry {
            key: self.key,
            value: self.value,
            expires_at: decode_timestamp(&self.expires_at)?,
            absolute_expiration: self.absolute_expiration.as_deref().map(decode_timestamp).transpose()?,
            sliding_expiration: self.sliding_expiration_us.map(decode_sliding).transpose()?,
        })
    }
}

/// Replace the row for `row.key`, inserting it if absent.
///
/// Runs as UPDATE then INSERT. If another writer inserts the key between the
/// two statements the INSERT hits the primary key and the write resolves as
/// `ConflictResolved`, leaving the other writer's row in place.
pub(crate) fn upsert(conn: &Connection, table: &str, row: &EntryRow) -> Result<SetOutcome, Error> {
    let updated = conn.execute(
        &format!(
            "UPDATE \"{table}\" SET
                value = ?2,
                expires_at = ?3,
                absolute_expiration = ?4,
                sliding_expiration_us = ?5
            WHERE key = ?1"
        ),
        params![
            &row.key,
            &row.value,
            &row.expires_at,
            &row.absolute_expiration,
            &row.sliding_expiration_us,
        ],
    )?;
    if updated > 0 {
        return Ok(SetOutcome::Written);
    }

    insert(conn, table, row)
}

/// Insert a new row, treating a duplicate key as a lost race.
pub(crate) fn insert(conn: &Connection, table: &str, row: &EntryRow) -> Result<SetOutcome, Error> {
    let result = conn.execute(
        &format!(
            "INSERT INTO \"{table}\" (key, value, expires_at, absolute_expiration, sliding_expiration_us)
            VALUES (?1, ?2, ?3, ?4, ?5)"
        ),
        params![
            &row.key,
            &row.value,
            &row.expires_at,
            &row.absolute_expiration,
            &row.sliding_expiration_us,
        ],
    );
    classify_insert(result)
}

/// Map an INSERT result onto a write outcome.
pub(crate) fn classify_insert(result: rusqlite::Result<usize>) -> Result<SetOutcome, Error> {
    match result {
        Ok(_) => Ok(SetOutcome::Written),
        Err(err) if is_duplicate_key(&err) => Ok(SetOutcome::ConflictResolved),
        Err(err) => Err(err.into()),
    }
}

fn is_duplicate_key(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && matches!(e.extended_code, ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE)
    )
}

/// Read the live row for `key`; rows with `expires_at <= now` are treated as absent.
pub(crate) fn select(
    conn: &Connection, table: &str, key: &str, now: DateTime<Utc>, include_value: bool,
) -> Result<Option<CacheEntry>, Error> {
    let value_column = if include_value { "value" } else { "NULL" };
    let mut stmt = conn.prepare(&format!(
        "SELECT key, {value_column}, expires_at, absolute_expiration, sliding_expiration_us
        FROM \"{table}\" WHERE key = ?1 AND expires_at > ?2"
    ))?;

    let stored = stmt
        .query_row(params![key, encode_timestamp(now)], |row| {
            Ok(StoredRow {
                key: row.get(0)?,
                value: row.get(1)?,
                expires_at: row.get(2)?,
                absolute_expiration: row.get(3)?,
                sliding_expiration_us: row.get(4)?,
            })
        })
        .optional()?;

    stored.map(StoredRow::decode).transpose()
}

/// Re-apply the sliding window of a live entry.
///
/// A read followed by a conditional update; the update only touches a row
/// that is still live, so an entry deleted or expired in between is reported
/// as `Missing` rather than resurrected.
pub(crate) fn refresh(conn: &Connection, table: &str, key: &str, now: DateTime<Utc>) -> Result<RefreshOutcome, Error> {
    let Some(entry) = select(conn, table, key, now, false)? else {
        return Ok(RefreshOutcome::Missing);
    };

    let Some(expires_at) = expiration::renew(entry.sliding_expiration, entry.absolute_expiration, now) else {
        return Ok(RefreshOutcome::Unchanged);
    };

    let updated = conn.execute(
        &format!("UPDATE \"{table}\" SET expires_at = ?2 WHERE key = ?1 AND expires_at > ?3"),
        params![key, encode_timestamp(expires_at), encode_timestamp(now)],
    )?;

    if updated == 0 {
        return Ok(RefreshOutcome::Missing);
    }
    Ok(RefreshOutcome::Renewed { expires_at })
}

/// Delete the row for `key`. Returns whether a row was removed.
pub(crate) fn delete(conn: &Connection, table: &str, key: &str) -> Result<bool, Error> {
    let count = conn.execute(&format!("DELETE FROM \"{table}\" WHERE key = ?1"), params![key])?;
    Ok(count > 0)
}

/// Delete every row with `expires_at <= now`. Returns the number removed.
pub(crate) fn sweep(conn: &Connection, table: &str, now: DateTime<Utc>) -> Result<u64, Error> {
    let count = conn.execute(&format!("DELETE FROM \"{table}\" WHERE expires_at <= ?1"), params![encode_timestamp(now)])?;
    Ok(count as u64)
}
