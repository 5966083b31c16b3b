//! FSL BET brain extraction

use serde::Deserialize;
use std::path::PathBuf;

use super::entities::{NeuroTool, ToolDefinition, ToolParameter};
use super::invocation::{InvocationContext, MissingOutput, RequiredInput, ToolInvocation};
use super::outputs::WrapperOutputs;
use super::parameters::ParameterMap;
use super::result::{BetOutputs, MetadataDetails, ToolOutputs};

fn default_output_prefix() -> String {
    "brain_extracted".to_string()
}

fn default_fractional_intensity() -> f64 {
    0.5
}

fn default_true() -> bool {
    true
}

/// Arguments of `fsl_bet_brain_extraction`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BetRequest {
    pub input_file: PathBuf,
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,
    /// Brain/non-brain threshold in [0, 1]; smaller values keep more tissue
    #[serde(default = "default_fractional_intensity")]
    pub fractional_intensity: f64,
    #[serde(default = "default_true")]
    pub generate_binary_mask: bool,
}

impl BetRequest {
    pub fn new(input_file: impl Into<PathBuf>) -> Self {
        Self {
            input_file: input_file.into(),
            output_prefix: default_output_prefix(),
            fractional_intensity: default_fractional_intensity(),
            generate_binary_mask: true,
        }
    }

    pub fn definition() -> ToolDefinition {
        ToolDefinition::new(
            NeuroTool::Bet,
            "Extract brain from skull using FSL BET. Removes skull and non-brain tissue \
             from a T1-weighted MRI image while preserving brain structure.",
        )
        .with_parameter(
            ToolParameter::new(
                "input_file",
                "Path to input T1-weighted MRI image (NIfTI format)",
                true,
            )
            .with_type("path"),
        )
        .with_parameter(
            ToolParameter::new("output_prefix", "Prefix for output files", false)
                .with_default(default_output_prefix()),
        )
        .with_parameter(
            ToolParameter::new(
                "fractional_intensity",
                "Brain/non-brain threshold (0-1)",
                false,
            )
            .with_type("number")
            .with_default(default_fractional_intensity()),
        )
        .with_parameter(
            ToolParameter::new("generate_binary_mask", "Generate binary brain mask", false)
                .with_type("boolean")
                .with_default(true),
        )
    }
}

impl ToolInvocation for BetRequest {
    fn tool(&self) -> NeuroTool {
        NeuroTool::Bet
    }

    fn required_inputs(&self) -> Vec<RequiredInput> {
        vec![RequiredInput::new("Input file", &self.input_file)]
    }

    fn destination_dir(&self, ctx: &InvocationContext) -> PathBuf {
        ctx.output_dir.clone()
    }

    fn parameters(&self, ctx: &InvocationContext) -> ParameterMap {
        let maskfile = ctx
            .output_dir
            .join(format!("{}.nii.gz", self.output_prefix));

        let mut params = ParameterMap::new()
            .with("infile", self.input_file.as_path())
            .with("maskfile", maskfile.as_path())
            .with("fractional_intensity", self.fractional_intensity);
        if self.generate_binary_mask {
            params.insert("binary_mask", true);
        }
        params
    }

    fn details(&self, _ctx: &InvocationContext) -> MetadataDetails {
        MetadataDetails::Bet {
            fractional_intensity: self.fractional_intensity,
        }
    }

    fn shape(
        &self,
        _ctx: &InvocationContext,
        outputs: &WrapperOutputs,
    ) -> Result<ToolOutputs, MissingOutput> {
        let brain_image = outputs
            .path("outfile")
            .ok_or_else(|| MissingOutput("outfile".to_string()))?
            .to_path_buf();
        let brain_mask = if self.generate_binary_mask {
            outputs.path("binary_mask").map(|p| p.to_path_buf())
        } else {
            None
        };

        Ok(ToolOutputs::Bet(BetOutputs {
            brain_image,
            brain_mask,
        }))
    }
}
