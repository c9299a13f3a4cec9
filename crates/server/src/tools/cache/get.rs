//! cache_get tool implementation.
//!
//! Reads a live entry by key. A miss is a normal result, not an error.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlcache_core::CacheStore;

use super::json_result;
use crate::tools::ValueEncoding;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Cache key.
    pub key: String,

    /// Encoding for the returned value: "utf8" (default) or "hex".
    #[serde(default)]
    pub encoding: ValueEncoding,

    /// Return only expiration metadata when false.
    #[serde(default = "default_true")]
    pub include_value: bool,
}

fn default_true() -> bool {
    true
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    pub key: String,
    pub found: bool,
    pub value: Option<String>,
    pub expires_at: Option<String>,
    pub absolute_expiration: Option<String>,
    /// Sliding window in seconds, with fractions.
    pub sliding_expiration_secs: Option<f64>,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(store: &CacheStore, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let entry = store.get_entry(&params.key, params.include_value).await?;

    let output = match entry {
        Some(entry) => CacheGetOutput {
            key: params.key,
            found: true,
            value: match (params.include_value, entry.value) {
                (true, value) => Some(params.encoding.encode(&value.unwrap_or_default())?),
                (false, _) => None,
            },
            expires_at: Some(entry.expires_at.to_rfc3339()),
            absolute_expiration: entry.absolute_expiration.map(|t| t.to_rfc3339()),
            sliding_expiration_secs: entry.sliding_expiration.map(|d| d.as_secs_f64()),
        },
        None => CacheGetOutput {
            key: params.key,
            found: false,
            value: None,
            expires_at: None,
            absolute_expiration: None,
            sliding_expiration_secs: None,
        },
    };

    json_result(&output)
}
