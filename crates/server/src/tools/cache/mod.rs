//! Cache MCP tools.
//!
//! One module per cache operation, each a thin layer over `CacheStore`.

pub mod delete;
pub mod get;
pub mod refresh;
pub mod set;
pub mod sweep;

pub use delete::{CacheDeleteParams, delete_impl};
pub use get::{CacheGetParams, get_impl};
pub use refresh::{CacheRefreshParams, refresh_impl};
pub use set::{CacheSetParams, set_impl};
pub use sweep::sweep_impl;

use rmcp::model::{CallToolResult, Content};
use serde::Serialize;
use sqlcache_core::Error;

/// Serialize a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, rmcp::ErrorData> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) mod test_support {
    use rmcp::model::CallToolResult;
    use serde::de::DeserializeOwned;
    use sqlcache_core::{CacheStore, StoreConfig};

    pub async fn store() -> CacheStore {
        CacheStore::open_in_memory(StoreConfig::default()).await.unwrap()
    }

    pub fn output<T: DeserializeOwned>(result: &CallToolResult) -> T {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }
}
