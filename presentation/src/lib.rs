//! Presentation layer for neuroimaging-mcp
//!
//! This crate contains the MCP server handler, CLI definitions and output
//! formatters.

pub mod cli;
pub mod mcp;
pub mod output;

// Re-export commonly used types
pub use cli::commands::{Cli, Command};
pub use mcp::server::NeuroimagingServer;
pub use output::console::ConsoleFormatter;
pub use output::formatter::{format_error_chain, format_result, format_tool_failure};
