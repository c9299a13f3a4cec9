//! cache_delete tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlcache_core::CacheStore;

use super::json_result;

/// Parameters for the cache_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheDeleteParams {
    /// Cache key.
    pub key: String,
}

/// Output from the cache_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheDeleteOutput {
    pub key: String,
    /// False when there was nothing to delete.
    pub deleted: bool,
}

/// Implementation of the cache_delete tool.
pub async fn delete_impl(store: &CacheStore, params: CacheDeleteParams) -> Result<CallToolResult, McpError> {
    let deleted = store.delete(&params.key).await?;
    json_result(&CacheDeleteOutput { key: params.key, deleted })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::cache::test_support::{output, store};
    use sqlcache_core::EntryOptions;
    use std::time::Duration;

    #[tokio::test]
    async fn test_delete_twice() {
        let store = store().await;
        store
            .set("k", b"v", EntryOptions::new().with_sliding(Duration::from_secs(60)))
            .await
            .unwrap();

        let first: CacheDeleteOutput =
            output(&delete_impl(&store, CacheDeleteParams { key: "k".into() }).await.unwrap());
        assert!(first.deleted);

        let second: CacheDeleteOutput =
            output(&delete_impl(&store, CacheDeleteParams { key: "k".into() }).await.unwrap());
        assert!(!second.deleted);
    }

    #[tokio::test]
    async fn test_delete_empty_key() {
        let store = store().await;
        assert!(delete_impl(&store, CacheDeleteParams { key: String::new() }).await.is_err());
    }
}
