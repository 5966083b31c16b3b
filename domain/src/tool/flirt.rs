//! FSL FLIRT linear registration

use serde::Deserialize;
use std::path::PathBuf;

use super::entities::{NeuroTool, ToolDefinition, ToolParameter};
use super::invocation::{
    InvocationContext, MissingOutput, RequiredInput, ToolInvocation, image_stem,
};
use super::outputs::WrapperOutputs;
use super::parameters::ParameterMap;
use super::result::{FlirtOutputs, MetadataDetails, ToolOutputs};

/// Cost function used for every registration
pub const FLIRT_COST: &str = "corratio";

fn default_output_file() -> PathBuf {
    PathBuf::from("registered.nii.gz")
}

fn default_dof() -> i64 {
    12
}

/// Arguments of `fsl_flirt_registration`.
///
/// `dof` is forwarded untouched; FLIRT itself decides what to do with values
/// other than 6, 7, 9 or 12.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FlirtRequest {
    pub input_file: PathBuf,
    pub reference_file: PathBuf,
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,
    #[serde(default = "default_dof")]
    pub dof: i64,
}

impl FlirtRequest {
    pub fn new(input_file: impl Into<PathBuf>, reference_file: impl Into<PathBuf>) -> Self {
        Self {
            input_file: input_file.into(),
            reference_file: reference_file.into(),
            output_file: default_output_file(),
            dof: default_dof(),
        }
    }

    pub fn definition() -> ToolDefinition {
        ToolDefinition::new(
            NeuroTool::Flirt,
            "Register an image to a reference image using FSL FLIRT linear registration.",
        )
        .with_parameter(
            ToolParameter::new("input_file", "Path to input image to be registered", true)
                .with_type("path"),
        )
        .with_parameter(
            ToolParameter::new("reference_file", "Path to reference image", true)
                .with_type("path"),
        )
        .with_parameter(
            ToolParameter::new(
                "output_file",
                "Path for output registered image; relative paths land in the output directory",
                false,
            )
            .with_type("path")
            .with_default("registered.nii.gz"),
        )
        .with_parameter(
            ToolParameter::new("dof", "Degrees of freedom for registration (6, 7, 9, or 12)", false)
                .with_type("integer")
                .with_default(default_dof()),
        )
    }

    fn resolved_output(&self, ctx: &InvocationContext) -> PathBuf {
        ctx.resolve_output(&self.output_file)
    }
}

impl ToolInvocation for FlirtRequest {
    fn tool(&self) -> NeuroTool {
        NeuroTool::Flirt
    }

    fn required_inputs(&self) -> Vec<RequiredInput> {
        vec![
            RequiredInput::new("Input file", &self.input_file),
            RequiredInput::new("Reference file", &self.reference_file),
        ]
    }

    fn destination_dir(&self, ctx: &InvocationContext) -> PathBuf {
        self.resolved_output(ctx)
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| ctx.output_dir.clone())
    }

    fn parameters(&self, ctx: &InvocationContext) -> ParameterMap {
        let outfile = self.resolved_output(ctx).to_string_lossy().into_owned();
        let omat = format!("{}.mat", image_stem(&outfile));

        ParameterMap::new()
            .with("infile", self.input_file.as_path())
            .with("reference", self.reference_file.as_path())
            .with("outfile", outfile)
            .with("omat", omat)
            .with("dof", self.dof)
            .with("cost", FLIRT_COST)
    }

    fn details(&self, _ctx: &InvocationContext) -> MetadataDetails {
        MetadataDetails::Flirt {
            dof: self.dof,
            cost: FLIRT_COST.to_string(),
        }
    }

    fn shape(
        &self,
        _ctx: &InvocationContext,
        outputs: &WrapperOutputs,
    ) -> Result<ToolOutputs, MissingOutput> {
        let registered_image = outputs
            .path("outfile")
            .ok_or_else(|| MissingOutput("outfile".to_string()))?
            .to_path_buf();

        Ok(ToolOutputs::Flirt(FlirtOutputs {
            registered_image,
            transformation_matrix: outputs.path("omat").map(|p| p.to_path_buf()),
        }))
    }
}
