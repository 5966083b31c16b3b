//! Execution runtime: where the external tools actually run
//!
//! The runtime is configured once at startup and the outcome is kept as an
//! explicit [`RuntimeState`]. Calls check the state after validating their
//! inputs, so a missing runtime and a broken runtime are distinct errors.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::tool::entities::{NeuroTool, ToolFamily};

/// How tool programs are launched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeKind {
    /// `docker run` with one image per tool family
    #[default]
    Docker,
    /// `podman run`, same layout as docker
    Podman,
    /// Programs on the host `PATH`
    Local,
}

impl RuntimeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeKind::Docker => "docker",
            RuntimeKind::Podman => "podman",
            RuntimeKind::Local => "local",
        }
    }

    pub fn is_container(&self) -> bool {
        !matches!(self, RuntimeKind::Local)
    }
}

impl std::fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RuntimeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "docker" => Ok(RuntimeKind::Docker),
            "podman" => Ok(RuntimeKind::Podman),
            "local" => Ok(RuntimeKind::Local),
            other => Err(format!("unknown runtime kind: {}", other)),
        }
    }
}

/// Container image per tool family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerImages {
    pub fsl: String,
    pub mrtrix3: String,
    pub freesurfer: String,
}

impl Default for ContainerImages {
    fn default() -> Self {
        Self {
            fsl: "brainlife/fsl:6.0.4-patched2".to_string(),
            mrtrix3: "mrtrix3/mrtrix3:3.0.4".to_string(),
            freesurfer: "freesurfer/freesurfer:7.4.1".to_string(),
        }
    }
}

impl ContainerImages {
    pub fn image_for(&self, family: ToolFamily) -> &str {
        match family {
            ToolFamily::Fsl => &self.fsl,
            ToolFamily::Mrtrix3 => &self.mrtrix3,
            ToolFamily::FreeSurfer => &self.freesurfer,
        }
    }
}

/// A runtime that passed startup checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRuntime {
    pub kind: RuntimeKind,
    /// Resolved engine binary (`docker`/`podman`); `None` for local runs
    pub engine: Option<PathBuf>,
    pub images: ContainerImages,
}

impl ExecutionRuntime {
    pub fn local() -> Self {
        Self {
            kind: RuntimeKind::Local,
            engine: None,
            images: ContainerImages::default(),
        }
    }

    pub fn container(kind: RuntimeKind, engine: impl Into<PathBuf>, images: ContainerImages) -> Self {
        Self {
            kind,
            engine: Some(engine.into()),
            images,
        }
    }

    /// Image the tool runs in, or `None` for local runs
    pub fn image_for(&self, tool: NeuroTool) -> Option<&str> {
        self.kind
            .is_container()
            .then(|| self.images.image_for(tool.family()))
    }

    /// Label recorded as `container` in result metadata.
    ///
    /// e.g. `"docker: brainlife/fsl:6.0.4-patched2"` or `"local"`
    pub fn container_label(&self, tool: NeuroTool) -> String {
        match self.image_for(tool) {
            Some(image) => format!("{}: {}", self.kind, image),
            None => self.kind.to_string(),
        }
    }
}

/// Outcome of configuring the execution runtime at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RuntimeState {
    /// No runtime was configured
    #[default]
    NotConfigured,
    Ready(ExecutionRuntime),
    /// Configuration was attempted and failed
    Failed { kind: RuntimeKind, reason: String },
}

impl RuntimeState {
    pub fn ready(&self) -> Option<&ExecutionRuntime> {
        match self {
            RuntimeState::Ready(runtime) => Some(runtime),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready().is_some()
    }

    /// One-line summary for logs and `--show-config`
    pub fn describe(&self) -> String {
        match self {
            RuntimeState::NotConfigured => "not configured".to_string(),
            RuntimeState::Ready(runtime) => match &runtime.engine {
                Some(engine) => format!("{} ({})", runtime.kind, engine.display()),
                None => runtime.kind.to_string(),
            },
            RuntimeState::Failed { kind, reason } => format!("{} unavailable: {}", kind, reason),
        }
    }
}
