//! The per-tool invocation contract
//!
//! [`ToolInvocation`] is the pure half of a tool call. It says what must
//! exist, where outputs go, what parameter mapping to send, and how to read
//! the wrapper's answer. The application layer owns the side effects
//! (existence checks, directory creation, the wrapper call itself).
//!
//! ```text
//! required_inputs ──▶ destination_dir ──▶ parameters ──▶ (wrapper) ──▶ shape
//! ```

use std::path::{Path, PathBuf};
use thiserror::Error;

use super::entities::NeuroTool;
use super::outputs::WrapperOutputs;
use super::parameters::ParameterMap;
use super::result::{MetadataDetails, ToolOutputs};

/// Server-side settings every invocation can consult.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    /// Directory for prefix-named outputs and relative output paths
    pub output_dir: PathBuf,
    /// FreeSurfer subjects directory used when the caller gives none
    pub subjects_dir: PathBuf,
}

impl InvocationContext {
    pub fn new(output_dir: impl Into<PathBuf>, subjects_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            subjects_dir: subjects_dir.into(),
        }
    }

    /// Resolve a caller-supplied output path; relative paths land in `output_dir`
    pub fn resolve_output(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.output_dir.join(path)
        }
    }
}

/// An input path that must exist before the tool is dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredInput {
    /// Human label used in error messages (e.g., "DWI file")
    pub label: &'static str,
    pub path: PathBuf,
}

impl RequiredInput {
    pub fn new(label: &'static str, path: impl Into<PathBuf>) -> Self {
        Self {
            label,
            path: path.into(),
        }
    }
}

/// The wrapper did not report an output the tool always produces.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("expected output '{0}' was not reported by the tool wrapper")]
pub struct MissingOutput(pub String);

/// Pure description of one tool call.
pub trait ToolInvocation: Send + Sync {
    fn tool(&self) -> NeuroTool;

    /// Paths to check, in order, before any side effect
    fn required_inputs(&self) -> Vec<RequiredInput>;

    /// Directory that must exist before the wrapper runs
    fn destination_dir(&self, ctx: &InvocationContext) -> PathBuf;

    /// The exact mapping passed to the wrapper
    fn parameters(&self, ctx: &InvocationContext) -> ParameterMap;

    /// Tool-specific fields recorded in the result metadata
    fn details(&self, ctx: &InvocationContext) -> MetadataDetails;

    /// Pick the expected outputs from what the wrapper reported
    fn shape(
        &self,
        ctx: &InvocationContext,
        outputs: &WrapperOutputs,
    ) -> Result<ToolOutputs, MissingOutput>;
}

/// Strip `.nii.gz` or `.nii` from an image path, keeping the directory.
pub fn image_stem(path: &str) -> &str {
    path.strip_suffix(".nii.gz")
        .or_else(|| path.strip_suffix(".nii"))
        .unwrap_or(path)
}
