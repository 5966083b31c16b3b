//! Infrastructure layer for neuroimaging-mcp
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the container tool wrapper, filesystem workspaces,
//! the JSONL invocation log, and configuration file loading.

pub mod config;
pub mod logging;
pub mod runtime;
pub mod schema;
pub mod workspace;
pub mod wrapper;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileLoggingConfig, FilePathsConfig,
    FileRuntimeConfig,
};
pub use logging::JsonlInvocationLogger;
pub use runtime::configure_runtime;
pub use schema::JsonSchemaToolConverter;
pub use workspace::LocalWorkspace;
pub use wrapper::ContainerToolWrapper;
