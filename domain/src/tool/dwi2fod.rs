//! MRTrix3 dwi2fod fiber orientation distribution estimation

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::entities::{NeuroTool, ToolDefinition, ToolParameter};
use super::invocation::{InvocationContext, MissingOutput, RequiredInput, ToolInvocation};
use super::outputs::WrapperOutputs;
use super::parameters::ParameterMap;
use super::result::{Dwi2FodOutputs, MetadataDetails, ToolOutputs};

/// Spherical deconvolution algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FodAlgorithm {
    /// Single-shell constrained spherical deconvolution
    #[default]
    Csd,
    /// Multi-shell multi-tissue CSD
    MsmtCsd,
}

impl FodAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            FodAlgorithm::Csd => "csd",
            FodAlgorithm::MsmtCsd => "msmt_csd",
        }
    }
}

impl std::fmt::Display for FodAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn default_output_fod() -> PathBuf {
    PathBuf::from("wmfod.mif")
}

/// Arguments of `mrtrix_dwi2fod`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Dwi2FodRequest {
    pub dwi_file: PathBuf,
    pub response_file: PathBuf,
    #[serde(default = "default_output_fod")]
    pub output_fod: PathBuf,
    #[serde(default)]
    pub algorithm: FodAlgorithm,
}

impl Dwi2FodRequest {
    pub fn new(dwi_file: impl Into<PathBuf>, response_file: impl Into<PathBuf>) -> Self {
        Self {
            dwi_file: dwi_file.into(),
            response_file: response_file.into(),
            output_fod: default_output_fod(),
            algorithm: FodAlgorithm::default(),
        }
    }

    pub fn definition() -> ToolDefinition {
        ToolDefinition::new(
            NeuroTool::Dwi2Fod,
            "Estimate fiber orientation distributions from diffusion-weighted imaging data \
             using MRTrix3 constrained spherical deconvolution.",
        )
        .with_parameter(
            ToolParameter::new("dwi_file", "Path to diffusion-weighted image", true)
                .with_type("path"),
        )
        .with_parameter(
            ToolParameter::new("response_file", "Path to response function file", true)
                .with_type("path"),
        )
        .with_parameter(
            ToolParameter::new(
                "output_fod",
                "Path for output FOD image; relative paths land in the output directory",
                false,
            )
            .with_type("path")
            .with_default("wmfod.mif"),
        )
        .with_parameter(
            ToolParameter::new("algorithm", "Deconvolution algorithm", false)
                .with_default(FodAlgorithm::Csd.as_str())
                .with_allowed_values([FodAlgorithm::Csd.as_str(), FodAlgorithm::MsmtCsd.as_str()]),
        )
    }
}

impl ToolInvocation for Dwi2FodRequest {
    fn tool(&self) -> NeuroTool {
        NeuroTool::Dwi2Fod
    }

    fn required_inputs(&self) -> Vec<RequiredInput> {
        vec![
            RequiredInput::new("DWI file", &self.dwi_file),
            RequiredInput::new("Response file", &self.response_file),
        ]
    }

    fn destination_dir(&self, ctx: &InvocationContext) -> PathBuf {
        ctx.resolve_output(&self.output_fod)
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| ctx.output_dir.clone())
    }

    fn parameters(&self, ctx: &InvocationContext) -> ParameterMap {
        let fod = ctx.resolve_output(&self.output_fod);

        ParameterMap::new()
            .with("algorithm", self.algorithm.as_str())
            .with("dwi", self.dwi_file.as_path())
            .with("response", self.response_file.as_path())
            .with("fod", fod.as_path())
    }

    fn details(&self, _ctx: &InvocationContext) -> MetadataDetails {
        MetadataDetails::Dwi2Fod {
            algorithm: self.algorithm,
        }
    }

    fn shape(
        &self,
        _ctx: &InvocationContext,
        outputs: &WrapperOutputs,
    ) -> Result<ToolOutputs, MissingOutput> {
        let fod_image = outputs
            .path("fod")
            .ok_or_else(|| MissingOutput("fod".to_string()))?
            .to_path_buf();

        Ok(ToolOutputs::Dwi2Fod(Dwi2FodOutputs { fod_image }))
    }
}
