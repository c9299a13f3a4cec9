//! Unified error types for sqlcache.
//!
//! Validation errors are raised before any statement is issued. Everything
//! the storage layer reports is surfaced as `StoreUnavailable`.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

use crate::config::ConfigError;

/// Unified error types for the cache store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty key).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Expiration options that can never produce a valid entry.
    #[error("INVALID_EXPIRATION: {0}")]
    InvalidExpiration(String),

    /// Neither a sliding nor an absolute expiration was supplied.
    #[error("MISSING_EXPIRATION: either absolute or sliding expiration needs to be provided")]
    MissingExpiration,

    /// Connection or statement failure in the backing database.
    #[error("STORE_UNAVAILABLE: {0}")]
    StoreUnavailable(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORE_UNAVAILABLE: migration failed: {0}")]
    MigrationFailed(String),

    /// A stored row could not be decoded.
    #[error("CORRUPT_ENTRY: {0}")]
    CorruptEntry(String),

    /// Store configuration rejected at construction.
    #[error("INVALID_CONFIG: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// True for caller-input failures detected before any I/O.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::InvalidInput(_) | Error::InvalidExpiration(_) | Error::MissingExpiration)
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::StoreUnavailable(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::StoreUnavailable(tokio_rusqlite::Error::Close(c)),
            _ => Error::StoreUnavailable(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::StoreUnavailable(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::StoreUnavailable(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::InvalidExpiration(msg) => (-32602, msg.clone()),
            Error::MissingExpiration => (-32602, "Either absolute or sliding expiration needs to be provided".to_string()),
            Error::StoreUnavailable(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
            Error::CorruptEntry(msg) => (-32003, msg.clone()),
            Error::Config(e) => (-32004, e.to_string()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
