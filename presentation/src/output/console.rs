//! Console output for the CLI subcommands

use colored::Colorize;
use neuro_domain::{RuntimeState, ToolSpec};

/// Formats CLI output for a terminal
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Human-readable tool catalog
    pub fn format_tool_list(spec: &ToolSpec) -> String {
        let mut output = String::new();
        for tool in spec.all() {
            output.push_str(&format!(
                "{} ({})\n  {}\n",
                tool.name.cyan().bold(),
                tool.tool,
                tool.description
            ));
            for param in &tool.parameters {
                let marker = if param.required {
                    "required".yellow().to_string()
                } else {
                    match &param.default {
                        Some(default) => format!("default: {}", default),
                        None => "optional".to_string(),
                    }
                };
                output.push_str(&format!(
                    "    {:<22} {:<8} {}  [{}]\n",
                    param.name, param.param_type, param.description, marker
                ));
            }
            output.push('\n');
        }
        output
    }

    /// One-line runtime status
    pub fn format_runtime(state: &RuntimeState) -> String {
        let label = "Runtime:".cyan().bold();
        match state {
            RuntimeState::Ready(_) => format!("{} {}", label, state.describe().green()),
            _ => format!("{} {}", label, state.describe().red()),
        }
    }

    pub fn format_error(message: &str) -> String {
        format!("{} {}", "Error:".red().bold(), message)
    }
}
