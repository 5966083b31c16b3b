//! Domain layer for neuroimaging-mcp
//!
//! This crate contains the typed vocabulary of the adapter: which tools
//! exist, what each tool call carries, which parameter mapping is handed to
//! the tool wrapper, and how results are shaped. It performs no I/O.
//!
//! # Core Concepts
//!
//! ## Tool invocation
//!
//! Every external tool (FSL BET, FSL FAST, FSL FLIRT, MRTrix3 dwi2fod,
//! FreeSurfer recon-all) is one variant of [`ToolRequest`]. Each variant
//! carries its own request struct, and each request struct implements
//! [`ToolInvocation`], which describes:
//!
//! - the input paths that must exist before dispatch
//! - the destination directory to create
//! - the exact [`ParameterMap`] passed to the wrapper
//! - how wrapper outputs become a [`ToolResult`]
//!
//! ## Execution runtime
//!
//! [`RuntimeState`] is the explicit outcome of configuring the container
//! runtime at startup. Use cases receive it and refuse to dispatch when the
//! runtime is missing or failed.

pub mod config;
pub mod core;
pub mod guide;
pub mod runtime;
pub mod tool;
pub mod workspace;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, Severity};
pub use core::error::DomainError;
pub use guide::{AnalysisType, analysis_guide};
pub use runtime::{ContainerImages, ExecutionRuntime, RuntimeKind, RuntimeState};
pub use tool::{
    entities::{NeuroTool, ToolDefinition, ToolFamily, ToolParameter, ToolSpec},
    invocation::{InvocationContext, MissingOutput, RequiredInput, ToolInvocation},
    outputs::{OutputValue, WrapperOutputs},
    parameters::{ParamValue, ParameterMap},
    request::{ToolRequest, default_tool_spec},
    result::{MetadataDetails, ToolMetadata, ToolOutputs, ToolResult},
    BetRequest, Dwi2FodRequest, FastRequest, FlirtRequest, FodAlgorithm, ReconAllRequest,
};
pub use workspace::{SessionId, WorkspaceListing};
