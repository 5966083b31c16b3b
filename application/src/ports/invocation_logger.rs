//! Port for structured invocation logging.
//!
//! Records the lifecycle of each tool call (`tool_started`,
//! `tool_completed`, `tool_failed`) as machine-readable events. This is
//! separate from `tracing`, which carries human-readable diagnostics.

use neuro_domain::{NeuroTool, ParameterMap};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::path::PathBuf;

fn rpc_name<S: Serializer>(tool: &NeuroTool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(tool.rpc_name())
}

/// Lifecycle event of one tool call, serialized with a `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InvocationEvent {
    ToolStarted {
        #[serde(serialize_with = "rpc_name")]
        tool: NeuroTool,
    },
    ToolCompleted {
        #[serde(serialize_with = "rpc_name")]
        tool: NeuroTool,
        /// Exactly what the wrapper received
        parameters: ParameterMap,
        outputs: BTreeMap<String, PathBuf>,
        duration_ms: u64,
    },
    ToolFailed {
        #[serde(serialize_with = "rpc_name")]
        tool: NeuroTool,
        kind: &'static str,
        error: String,
        duration_ms: u64,
    },
}

impl InvocationEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            InvocationEvent::ToolStarted { .. } => "tool_started",
            InvocationEvent::ToolCompleted { .. } => "tool_completed",
            InvocationEvent::ToolFailed { .. } => "tool_failed",
        }
    }

    pub fn tool(&self) -> NeuroTool {
        match self {
            InvocationEvent::ToolStarted { tool }
            | InvocationEvent::ToolCompleted { tool, .. }
            | InvocationEvent::ToolFailed { tool, .. } => *tool,
        }
    }
}

/// Port for recording invocation events.
///
/// `log` is synchronous and infallible. Implementations report their own
/// write failures through `tracing`.
pub trait InvocationLogger: Send + Sync {
    fn log(&self, event: InvocationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoInvocationLogger;

impl InvocationLogger for NoInvocationLogger {
    fn log(&self, _event: InvocationEvent) {}
}
