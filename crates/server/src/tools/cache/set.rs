//! cache_set tool implementation.
//!
//! Writes a value with absolute and/or sliding expiration.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlcache_core::{CacheStore, EntryOptions, Error, SetOutcome};

use super::json_result;
use crate::error::ToolError;
use crate::tools::ValueEncoding;

/// Parameters for the cache_set tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheSetParams {
    /// Cache key.
    pub key: String,

    /// The value, in the given encoding.
    pub value: String,

    /// How `value` is encoded: "utf8" (default) or "hex".
    #[serde(default)]
    pub encoding: ValueEncoding,

    /// Sliding window in seconds, fractions allowed; each refresh pushes the
    /// expiry this far out.
    #[serde(default)]
    pub sliding_expiration_secs: Option<f64>,

    /// Expire this many seconds after the write, fractions allowed.
    #[serde(default)]
    pub absolute_expiration_relative_secs: Option<f64>,

    /// Expire at this RFC 3339 instant.
    #[serde(default)]
    pub absolute_expiration: Option<String>,
}

/// Output from the cache_set tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheSetOutput {
    pub key: String,
    /// "written", or "conflict_resolved" when a concurrent writer got there first.
    pub outcome: String,
}

impl CacheSetParams {
    fn options(&self) -> Result<EntryOptions, McpError> {
        let mut options = EntryOptions::new();

        match (self.absolute_expiration_relative_secs, &self.absolute_expiration) {
            (Some(_), Some(_)) => {
                return Err(ToolError::InvalidInput(
                    "Specify at most one of absolute_expiration_relative_secs or absolute_expiration".into(),
                )
                .into());
            }
            (Some(secs), None) => {
                options = options.with_absolute_relative_to_now(seconds("absolute_expiration_relative_secs", secs)?);
            }
            (None, Some(raw)) => {
                let at = DateTime::parse_from_rfc3339(raw)
                    .map_err(|e| Error::InvalidExpiration(format!("absolute_expiration is not RFC 3339: {e}")))?;
                options = options.with_absolute_at(at.with_timezone(&Utc));
            }
            (None, None) => {}
        }

        if let Some(secs) = self.sliding_expiration_secs {
            options = options.with_sliding(seconds("sliding_expiration_secs", secs)?);
        }

        Ok(options)
    }
}

fn seconds(field: &str, secs: f64) -> Result<Duration, McpError> {
    Duration::try_from_secs_f64(secs).map_err(|e| Error::InvalidExpiration(format!("{field}: {e}")).into())
}

/// Implementation of the cache_set tool.
pub async fn set_impl(store: &CacheStore, params: CacheSetParams) -> Result<CallToolResult, McpError> {
    let options = params.options()?;
    let value = params.encoding.decode(&params.value)?;

    let outcome = store.set(&params.key, &value, options).await?;

    let outcome = match outcome {
        SetOutcome::Written => "written",
        SetOutcome::ConflictResolved => "conflict_resolved",
    };
    json_result(&CacheSetOutput { key: params.key, outcome: outcome.into() })
}
