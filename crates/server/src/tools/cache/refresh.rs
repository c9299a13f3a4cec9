//! cache_refresh tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlcache_core::{CacheStore, RefreshOutcome};

use super::json_result;

/// Parameters for the cache_refresh tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheRefreshParams {
    /// Cache key.
    pub key: String,
}

/// Output from the cache_refresh tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheRefreshOutput {
    pub key: String,
    /// "renewed", "unchanged" (no sliding expiration) or "missing".
    pub outcome: String,
    /// New expiry when renewed.
    pub expires_at: Option<String>,
}

/// Implementation of the cache_refresh tool.
pub async fn refresh_impl(store: &CacheStore, params: CacheRefreshParams) -> Result<CallToolResult, McpError> {
    let (outcome, expires_at) = match store.refresh(&params.key).await? {
        RefreshOutcome::Renewed { expires_at } => ("renewed", Some(expires_at.to_rfc3339())),
        RefreshOutcome::Unchanged => ("unchanged", None),
        RefreshOutcome::Missing => ("missing", None),
    };

    json_result(&CacheRefreshOutput { key: params.key, outcome: outcome.into(), expires_at })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::cache::test_support::{output, store};
    use sqlcache_core::EntryOptions;
    use std::time::Duration;

    #[tokio::test]
    async fn test_refresh_sliding_entry() {
        let store = store().await;
        store
            .set("k", b"v", EntryOptions::new().with_sliding(Duration::from_secs(60)))
            .await
            .unwrap();

        let result = refresh_impl(&store, CacheRefreshParams { key: "k".into() }).await.unwrap();
        let out: CacheRefreshOutput = output(&result);
        assert_eq!(out.outcome, "renewed");
        assert!(out.expires_at.is_some());
    }

    #[tokio::test]
    async fn test_refresh_missing() {
        let store = store().await;
        let result = refresh_impl(&store, CacheRefreshParams { key: "ghost".into() }).await.unwrap();
        let out: CacheRefreshOutput = output(&result);
        assert_eq!(out.outcome, "missing");
    }
}
