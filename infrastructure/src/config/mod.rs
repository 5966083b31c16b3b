//! Configuration file loading for neuroimaging-mcp
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `NEUROIMAGING_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./neuroimaging.toml` or `./.neuroimaging.toml`
//! 4. Global: `~/.config/neuroimaging-mcp/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileLoggingConfig, FilePathsConfig, FileRuntimeConfig,
    RUNTIME_NONE,
};
pub use loader::ConfigLoader;
