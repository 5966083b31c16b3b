//! MCP server surface

pub mod catalog;
pub mod server;
