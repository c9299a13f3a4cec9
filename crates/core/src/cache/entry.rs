//! Cache entry and operation outcome types.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::Error;

/// A cache row as read back from the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: String,
    /// `None` on metadata-only reads.
    pub value: Option<Vec<u8>>,
    pub expires_at: DateTime<Utc>,
    pub absolute_expiration: Option<DateTime<Utc>>,
    pub sliding_expiration: Option<Duration>,
}

/// How a successful write landed.
///
/// Both variants are success; `ConflictResolved` means a concurrent writer
/// inserted the same key first and its value stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    Written,
    ConflictResolved,
}

/// Result of a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The sliding window was re-applied.
    Renewed { expires_at: DateTime<Utc> },
    /// The entry has no sliding expiration; nothing to extend.
    Unchanged,
    /// No live row for the key, or it vanished before the rewrite.
    Missing,
}

pub(crate) fn validate_key(key: &str) -> Result<(), Error> {
    if key.is_empty() {
        return Err(Error::InvalidInput("key cannot be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_key() {
        assert!(validate_key("a").is_ok());
        assert!(validate_key(&"k".repeat(450)).is_ok());
        assert!(validate_key(&"k".repeat(10_000)).is_ok());
        assert!(matches!(validate_key(""), Err(Error::InvalidInput(_))));
    }
}
