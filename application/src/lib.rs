//! Application layer for neuroimaging-mcp
//!
//! This crate contains the use cases and the ports they drive. It depends
//! only on the domain layer; process launching, configuration and the RPC
//! surface live in outer layers.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    invocation_logger::{InvocationEvent, InvocationLogger, NoInvocationLogger},
    tool_schema::ToolSchemaPort,
    tool_wrapper::{ToolWrapperPort, WrapperError},
    workspace::{WorkspaceError, WorkspacePort},
};
pub use use_cases::describe_workspace::{DescribeWorkspaceError, DescribeWorkspaceUseCase};
pub use use_cases::run_tool::{RunToolError, RunToolUseCase, Stage, StageError};
pub use use_cases::validate_inputs::ParameterValidator;
