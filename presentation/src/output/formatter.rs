//! Response formatting shared by the RPC surface and the CLI

use neuro_application::RunToolError;
use neuro_domain::ToolResult;
use std::error::Error;

/// Pretty-printed JSON response map for a successful call
pub fn format_result(result: &ToolResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&result.to_json()?)
}

/// An error followed by each underlying cause not already in its message
pub fn format_error_chain(error: &dyn Error) -> String {
    let mut output = error.to_string();
    let mut seen = output.clone();
    let mut source = error.source();

    while let Some(cause) = source {
        let message = cause.to_string();
        if !seen.contains(&message) {
            output.push_str(&format!("\n  caused by: {}", message));
            seen.push_str(&message);
        }
        source = cause.source();
    }
    output
}

/// Failure text for a tool call, always naming the tool
pub fn format_tool_failure(error: &RunToolError) -> String {
    match error {
        RunToolError::MissingInput { tool, .. } => {
            format!("{}: {}", tool, format_error_chain(error))
        }
        _ => format_error_chain(error),
    }
}
