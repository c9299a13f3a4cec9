//! SQLite-backed distributed cache with absolute and sliding expiration.
//!
//! This module provides a persistent, keyed cache table accessed either
//! asynchronously via tokio-rusqlite or blocking via rusqlite. It supports:
//!
//! - Absolute (fixed or relative-to-now) and sliding expiration
//! - Update-then-insert upserts that absorb duplicate-key races
//! - Read-time filtering of logically expired rows
//! - A single-statement sweep that reclaims expired rows
//! - Automatic schema migrations

pub mod blocking;
pub mod entry;
pub mod expiration;
pub mod migrations;
pub mod options;
mod statements;
pub mod store;

pub use crate::Error;

pub use blocking::BlockingCacheStore;
pub use entry::{CacheEntry, RefreshOutcome, SetOutcome};
pub use options::{AbsoluteExpiration, EntryOptions};
pub use store::CacheStore;
