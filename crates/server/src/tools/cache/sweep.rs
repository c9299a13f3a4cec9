//! cache_sweep tool implementation.
//!
//! Runs one expiration sweep on demand, outside the background schedule.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlcache_core::CacheStore;

use super::json_result;

/// Output from the cache_sweep tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheSweepOutput {
    /// Number of entries deleted.
    pub deleted: u64,
}

/// Implementation of the cache_sweep tool.
pub async fn sweep_impl(store: &CacheStore) -> Result<CallToolResult, McpError> {
    let deleted = store.run_expiration_sweep().await?;
    json_result(&CacheSweepOutput { deleted })
}
