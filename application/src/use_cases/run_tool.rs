//! Run tool use case
//!
//! Drives one tool call from a parsed [`ToolRequest`] to a [`ToolResult`]:
//!
//! 1. **Validate** - every required input path must exist
//! 2. **Runtime check** - the execution runtime must be ready
//! 3. **Prepare** - create the destination directory
//! 4. **Execute** - hand the parameter mapping to the tool wrapper
//! 5. **Collect** - shape the wrapper's outputs into the result
//!
//! A failure at any step returns immediately; later steps never run.

use crate::ports::invocation_logger::{InvocationEvent, InvocationLogger, NoInvocationLogger};
use crate::ports::tool_wrapper::{ToolWrapperPort, WrapperError};
use crate::use_cases::validate_inputs::ParameterValidator;
use neuro_domain::{
    InvocationContext, MissingOutput, NeuroTool, RuntimeState, ToolMetadata, ToolRequest,
    ToolResult,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Step of a dispatched call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    PrepareOutput,
    Execute,
    CollectOutputs,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::PrepareOutput => "prepare output directory",
            Stage::Execute => "execute",
            Stage::CollectOutputs => "collect outputs",
        };
        write!(f, "{}", s)
    }
}

/// Underlying cause of a [`RunToolError::ToolFailed`].
#[derive(Error, Debug)]
pub enum StageError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Wrapper(#[from] WrapperError),

    #[error(transparent)]
    MissingOutput(#[from] MissingOutput),
}

/// Errors that can occur while running a tool.
#[derive(Error, Debug)]
pub enum RunToolError {
    /// A required input does not exist. Raised before any side effect.
    #[error("{label} not found: {}", path.display())]
    MissingInput {
        tool: NeuroTool,
        label: &'static str,
        path: PathBuf,
    },

    #[error("{tool} cannot run: no execution runtime is configured")]
    RuntimeNotConfigured { tool: NeuroTool },

    #[error("{tool} cannot run: execution runtime unavailable ({reason})")]
    RuntimeUnavailable { tool: NeuroTool, reason: String },

    #[error("{tool} processing failed during {stage}: {source}")]
    ToolFailed {
        tool: NeuroTool,
        stage: Stage,
        source: StageError,
    },
}

impl RunToolError {
    pub fn tool(&self) -> NeuroTool {
        match self {
            RunToolError::MissingInput { tool, .. }
            | RunToolError::RuntimeNotConfigured { tool }
            | RunToolError::RuntimeUnavailable { tool, .. }
            | RunToolError::ToolFailed { tool, .. } => *tool,
        }
    }

    /// Short machine-readable kind for logs
    pub fn kind(&self) -> &'static str {
        match self {
            RunToolError::MissingInput { .. } => "missing_input",
            RunToolError::RuntimeNotConfigured { .. } => "runtime_not_configured",
            RunToolError::RuntimeUnavailable { .. } => "runtime_unavailable",
            RunToolError::ToolFailed { .. } => "tool_failed",
        }
    }
}

/// Use case for running a single neuroimaging tool.
///
/// Holds no per-call state, so one instance serves concurrent calls.
pub struct RunToolUseCase<W: ToolWrapperPort + 'static> {
    wrapper: Arc<W>,
    runtime: RuntimeState,
    context: InvocationContext,
    logger: Arc<dyn InvocationLogger>,
}

impl<W: ToolWrapperPort + 'static> RunToolUseCase<W> {
    pub fn new(wrapper: Arc<W>, runtime: RuntimeState, context: InvocationContext) -> Self {
        Self {
            wrapper,
            runtime,
            context,
            logger: Arc::new(NoInvocationLogger),
        }
    }

    /// Set the invocation logger (builder pattern)
    pub fn with_logger(mut self, logger: Arc<dyn InvocationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn runtime(&self) -> &RuntimeState {
        &self.runtime
    }

    pub fn context(&self) -> &InvocationContext {
        &self.context
    }

    pub async fn execute(&self, request: &ToolRequest) -> Result<ToolResult, RunToolError> {
        let tool = request.tool();
        let started = Instant::now();
        self.logger.log(InvocationEvent::ToolStarted { tool });

        let result = self.run(request).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(output) => {
                info!(tool = %tool, duration_ms, "Tool completed");
                self.logger.log(InvocationEvent::ToolCompleted {
                    tool,
                    parameters: output.metadata().parameters.clone(),
                    outputs: output.output_paths(),
                    duration_ms,
                });
            }
            Err(e) => {
                warn!(tool = %tool, error = %e, "Tool call failed");
                self.logger.log(InvocationEvent::ToolFailed {
                    tool,
                    kind: e.kind(),
                    error: e.to_string(),
                    duration_ms,
                });
            }
        }

        result
    }

    async fn run(&self, request: &ToolRequest) -> Result<ToolResult, RunToolError> {
        let invocation = request.invocation();
        let tool = invocation.tool();
        let ctx = &self.context;

        // Validate
        let inputs = invocation.required_inputs();
        if let Some(missing) = ParameterValidator::first_missing(&inputs).await {
            return Err(RunToolError::MissingInput {
                tool,
                label: missing.label,
                path: missing.path.clone(),
            });
        }

        // Runtime check
        let runtime = match &self.runtime {
            RuntimeState::Ready(runtime) => runtime,
            RuntimeState::NotConfigured => return Err(RunToolError::RuntimeNotConfigured { tool }),
            RuntimeState::Failed { reason, .. } => {
                return Err(RunToolError::RuntimeUnavailable {
                    tool,
                    reason: reason.clone(),
                });
            }
        };

        // Prepare
        let destination = invocation.destination_dir(ctx);
        tokio::fs::create_dir_all(&destination)
            .await
            .map_err(|source| RunToolError::ToolFailed {
                tool,
                stage: Stage::PrepareOutput,
                source: StageError::Io {
                    path: destination.clone(),
                    source,
                },
            })?;

        // Execute
        let parameters = invocation.parameters(ctx);
        info!(tool = %tool, destination = %destination.display(), "Running tool");
        debug!(tool = %tool, parameters = ?parameters, "Tool parameters");
        let outputs = self
            .wrapper
            .execute(runtime, tool, &parameters)
            .await
            .map_err(|e| RunToolError::ToolFailed {
                tool,
                stage: Stage::Execute,
                source: e.into(),
            })?;

        // Collect
        let shaped = invocation
            .shape(ctx, &outputs)
            .map_err(|e| RunToolError::ToolFailed {
                tool,
                stage: Stage::CollectOutputs,
                source: e.into(),
            })?;

        let metadata = ToolMetadata {
            tool,
            parameters,
            container: Some(runtime.container_label(tool)),
            details: invocation.details(ctx),
        };
        Ok(ToolResult::new(shaped, metadata))
    }
}
