//! Core types and shared functionality for sqlcache.
//!
//! This crate provides:
//! - A distributed cache store persisted in a SQLite table
//! - Absolute and sliding expiration semantics with a sweep for expired rows
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;

pub use cache::{AbsoluteExpiration, BlockingCacheStore, CacheEntry, CacheStore, EntryOptions, RefreshOutcome, SetOutcome};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AppConfig, StoreConfig};
pub use error::Error;
