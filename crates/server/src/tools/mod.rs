//! MCP tool implementations.
//!
//! This module contains all tools exposed by the sqlcache server.

pub mod cache;
pub mod value;

pub use value::ValueEncoding;
