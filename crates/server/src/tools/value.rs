//! Wire encoding for cache values.
//!
//! Values are opaque bytes; tools carry them as UTF-8 text or hex.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ValueEncoding {
    #[default]
    Utf8,
    Hex,
}

impl ValueEncoding {
    pub fn decode(self, raw: &str) -> Result<Vec<u8>, ToolError> {
        match self {
            ValueEncoding::Utf8 => Ok(raw.as_bytes().to_vec()),
            ValueEncoding::Hex => hex::decode(raw).map_err(|e| ToolError::InvalidEncoding(format!("invalid hex: {e}"))),
        }
    }

    pub fn encode(self, bytes: &[u8]) -> Result<String, ToolError> {
        match self {
            ValueEncoding::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|_| {
                ToolError::InvalidEncoding("stored value is not valid UTF-8; request encoding \"hex\"".into())
            }),
            ValueEncoding::Hex => Ok(hex::encode(bytes)),
        }
    }
}
