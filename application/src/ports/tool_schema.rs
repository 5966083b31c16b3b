//! Tool schema conversion port.
//!
//! Separates "which tools exist" (domain) from "how they are advertised to
//! RPC clients" (infrastructure).

use neuro_domain::{ToolDefinition, ToolSpec};

/// Port for converting tool definitions to JSON Schema.
pub trait ToolSchemaPort: Send + Sync {
    /// Convert a single tool definition to `{name, description, input_schema}`.
    fn tool_to_schema(&self, tool: &ToolDefinition) -> serde_json::Value;

    /// Convert all tools to a JSON Schema array (sorted by name).
    fn all_tools_schema(&self, spec: &ToolSpec) -> Vec<serde_json::Value>;
}
