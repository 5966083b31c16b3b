//! Tool wrapper port
//!
//! Defines how the application layer launches an external neuroimaging
//! program. Adapters live in the infrastructure layer.

use async_trait::async_trait;
use neuro_domain::{ExecutionRuntime, NeuroTool, ParameterMap, WrapperOutputs};
use thiserror::Error;

/// Errors raised while running a tool program
#[derive(Error, Debug)]
pub enum WrapperError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    NonZeroExit {
        program: String,
        status: String,
        /// Last lines of the program's stderr
        stderr: String,
    },

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },
}

/// Port for running one tool program with a parameter mapping.
///
/// `execute` is the only suspension point of a tool call. Implementations
/// report what the program produced as named [`WrapperOutputs`].
#[async_trait]
pub trait ToolWrapperPort: Send + Sync {
    async fn execute(
        &self,
        runtime: &ExecutionRuntime,
        tool: NeuroTool,
        params: &ParameterMap,
    ) -> Result<WrapperOutputs, WrapperError>;
}
