//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the cache tool implementations.
use crate::tools::cache::{
    CacheDeleteParams, CacheGetParams, CacheRefreshParams, CacheSetParams, delete_impl, get_impl, refresh_impl,
    set_impl, sweep_impl,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use sqlcache_core::CacheStore;

/// The main MCP server handler for sqlcache.
#[derive(Clone)]
pub struct SqlCacheServer {
    store: CacheStore,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl SqlCacheServer {
    /// Create a new server handler over `store`.
    pub fn new(store: CacheStore) -> Self {
        Self { store, tool_router: Self::tool_router() }
    }

    #[tool(
        description = "Store a value under a key. Requires sliding_expiration_secs and/or one absolute expiration \
                       (absolute_expiration_relative_secs or an RFC 3339 absolute_expiration)."
    )]
    async fn cache_set(&self, params: Parameters<CacheSetParams>) -> Result<CallToolResult, McpError> {
        set_impl(&self.store, params.0).await
    }

    #[tool(description = "Read a live cache entry by key. Does not extend its expiration.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.store, params.0).await
    }

    #[tool(description = "Extend a sliding-expiration entry by its sliding window. No-op for absolute-only entries.")]
    async fn cache_refresh(&self, params: Parameters<CacheRefreshParams>) -> Result<CallToolResult, McpError> {
        refresh_impl(&self.store, params.0).await
    }

    #[tool(description = "Delete a cache entry. Deleting a missing key is not an error.")]
    async fn cache_delete(&self, params: Parameters<CacheDeleteParams>) -> Result<CallToolResult, McpError> {
        delete_impl(&self.store, params.0).await
    }

    #[tool(description = "Delete all expired entries now and return how many were removed.")]
    async fn cache_sweep(&self) -> Result<CallToolResult, McpError> {
        sweep_impl(&self.store).await
    }
}

impl ServerHandler for SqlCacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "sqlcache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlcache_core::StoreConfig;

    #[tokio::test]
    async fn test_all_cache_tools_registered() {
        let store = CacheStore::open_in_memory(StoreConfig::default()).await.unwrap();
        let server = SqlCacheServer::new(store);

        let mut names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        names.sort();
        assert_eq!(names, ["cache_delete", "cache_get", "cache_refresh", "cache_set", "cache_sweep"]);
    }
}
