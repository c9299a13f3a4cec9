//! Per-write expiration options.

use std::time::Duration;

use chrono::{DateTime, Utc};

/// The two ways a caller can bound an entry's lifetime absolutely.
///
/// Being an enum, at most one form can be supplied per write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsoluteExpiration {
    /// Expire at this instant.
    At(DateTime<Utc>),
    /// Expire this long after the write.
    RelativeToNow(Duration),
}

/// Expiration options supplied with a write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryOptions {
    pub absolute: Option<AbsoluteExpiration>,
    /// Window that each refresh pushes the expiry forward by.
    ///
    /// Stored with whole-second precision.
    pub sliding: Option<Duration>,
}

impl EntryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sliding(mut self, sliding: Duration) -> Self {
        self.sliding = Some(sliding);
        self
    }

    pub fn with_absolute_at(mut self, at: DateTime<Utc>) -> Self {
        self.absolute = Some(AbsoluteExpiration::At(at));
        self
    }

    pub fn with_absolute_relative_to_now(mut self, after: Duration) -> Self {
        self.absolute = Some(AbsoluteExpiration::RelativeToNow(after));
        self
    }

    /// True when either an absolute or a sliding expiration is present.
    pub fn has_expiration(&self) -> bool {
        self.absolute.is_some() || self.sliding.is_some()
    }
}
