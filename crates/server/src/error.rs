//! Structured errors for the sqlcache MCP server.
//!
//! Raised while translating tool parameters, before the cache store is involved.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Structured errors for the sqlcache MCP server.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Invalid input parameters (e.g., two absolute expirations).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// A value could not be converted to or from its wire encoding.
    #[error("INVALID_ENCODING: {0}")]
    InvalidEncoding(String),
}

impl From<ToolError> for McpError {
    fn from(err: ToolError) -> Self {
        let (code, message) = match &err {
            ToolError::InvalidInput(msg) => (-32602, msg.clone()),
            ToolError::InvalidEncoding(msg) => (-32602, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}
