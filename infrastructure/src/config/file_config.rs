//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

use neuro_domain::{ConfigIssue, ConfigIssueCode, ContainerImages, InvocationContext, RuntimeKind, ToolFamily};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Runtime `kind` value that disables tool execution
pub const RUNTIME_NONE: &str = "none";

/// Configuration rejected at startup
#[derive(Debug, Error)]
#[error("invalid configuration: {}", messages(.issues))]
pub struct ConfigValidationError {
    pub issues: Vec<ConfigIssue>,
}

fn messages(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|i| i.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Raw `[paths]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePathsConfig {
    /// Where prefix-named outputs and relative output paths go
    pub output_dir: PathBuf,
    /// Default FreeSurfer subjects directory
    pub subjects_dir: PathBuf,
    /// Root under which session workspaces live
    pub workspace_root: PathBuf,
}

impl Default for FilePathsConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./data/outputs"),
            subjects_dir: PathBuf::from("./data/freesurfer_subjects"),
            workspace_root: PathBuf::from("/tmp/neuroimaging_workspace"),
        }
    }
}

/// Raw `[runtime]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRuntimeConfig {
    /// "docker", "podman", "local", or "none"
    pub kind: String,
    pub images: ContainerImages,
}

impl Default for FileRuntimeConfig {
    fn default() -> Self {
        Self {
            kind: RuntimeKind::Docker.to_string(),
            images: ContainerImages::default(),
        }
    }
}

impl FileRuntimeConfig {
    /// Parsed runtime kind; `Ok(None)` when execution is disabled
    pub fn requested_kind(&self) -> Result<Option<RuntimeKind>, String> {
        if self.kind.eq_ignore_ascii_case(RUNTIME_NONE) {
            return Ok(None);
        }
        self.kind.parse().map(Some)
    }
}

/// Raw `[logging]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL file receiving one line per tool lifecycle event
    pub invocation_log: Option<PathBuf>,
}

/// Complete configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub paths: FilePathsConfig,
    pub runtime: FileRuntimeConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Check the configuration.
    ///
    /// Returns the non-fatal warnings, or every issue when at least one is
    /// fatal.
    pub fn validate(&self) -> Result<Vec<ConfigIssue>, ConfigValidationError> {
        let mut issues = Vec::new();

        match self.runtime.requested_kind() {
            Ok(Some(kind)) if kind.is_container() => {
                for family in [ToolFamily::Fsl, ToolFamily::Mrtrix3, ToolFamily::FreeSurfer] {
                    if self.runtime.images.image_for(family).trim().is_empty() {
                        issues.push(ConfigIssue::error(
                            ConfigIssueCode::EmptyImage {
                                family: family.to_string(),
                            },
                            format!("runtime.images.{} cannot be empty for {} runs", family, kind),
                        ));
                    }
                }
            }
            Ok(_) => {}
            Err(_) => {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "runtime.kind".to_string(),
                        value: self.runtime.kind.clone(),
                        valid_values: vec![
                            "docker".to_string(),
                            "podman".to_string(),
                            "local".to_string(),
                            RUNTIME_NONE.to_string(),
                        ],
                    },
                    format!(
                        "runtime.kind '{}' is not one of docker, podman, local, none",
                        self.runtime.kind
                    ),
                ));
            }
        }

        if self.paths.workspace_root.is_relative() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::RelativePath {
                    field: "paths.workspace_root".to_string(),
                },
                format!(
                    "paths.workspace_root '{}' is relative and depends on the working directory",
                    self.paths.workspace_root.display()
                ),
            ));
        }

        if issues.iter().any(ConfigIssue::is_error) {
            return Err(ConfigValidationError { issues });
        }
        Ok(issues)
    }

    /// Directories handed to every tool invocation, resolved against the
    /// current directory so results and containers see the same paths
    pub fn invocation_context(&self) -> InvocationContext {
        let absolute = |dir: &PathBuf| std::path::absolute(dir).unwrap_or_else(|_| dir.clone());
        InvocationContext::new(
            absolute(&self.paths.output_dir),
            absolute(&self.paths.subjects_dir),
        )
    }
}
