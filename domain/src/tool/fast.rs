//! FSL FAST tissue segmentation

use serde::Deserialize;
use std::path::PathBuf;

use super::entities::{NeuroTool, ToolDefinition, ToolParameter};
use super::invocation::{InvocationContext, MissingOutput, RequiredInput, ToolInvocation};
use super::outputs::WrapperOutputs;
use super::parameters::ParameterMap;
use super::result::{FastOutputs, MetadataDetails, ToolOutputs};

fn default_output_prefix() -> String {
    "segmented".to_string()
}

fn default_tissue_classes() -> u32 {
    3
}

/// Arguments of `fsl_fast_segmentation`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FastRequest {
    /// Brain-extracted T1-weighted image
    pub input_file: PathBuf,
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,
    #[serde(default = "default_tissue_classes")]
    pub tissue_classes: u32,
}

impl FastRequest {
    pub fn new(input_file: impl Into<PathBuf>) -> Self {
        Self {
            input_file: input_file.into(),
            output_prefix: default_output_prefix(),
            tissue_classes: default_tissue_classes(),
        }
    }

    pub fn definition() -> ToolDefinition {
        ToolDefinition::new(
            NeuroTool::Fast,
            "Segment brain tissue into gray matter, white matter and cerebrospinal fluid \
             using FSL FAST.",
        )
        .with_parameter(
            ToolParameter::new(
                "input_file",
                "Path to brain-extracted T1-weighted image",
                true,
            )
            .with_type("path"),
        )
        .with_parameter(
            ToolParameter::new("output_prefix", "Prefix for output files", false)
                .with_default(default_output_prefix()),
        )
        .with_parameter(
            ToolParameter::new("tissue_classes", "Number of tissue classes", false)
                .with_type("integer")
                .with_default(default_tissue_classes()),
        )
    }
}

impl ToolInvocation for FastRequest {
    fn tool(&self) -> NeuroTool {
        NeuroTool::Fast
    }

    fn required_inputs(&self) -> Vec<RequiredInput> {
        vec![RequiredInput::new("Input file", &self.input_file)]
    }

    fn destination_dir(&self, ctx: &InvocationContext) -> PathBuf {
        ctx.output_dir.clone()
    }

    fn parameters(&self, ctx: &InvocationContext) -> ParameterMap {
        let basename = ctx.output_dir.join(&self.output_prefix);

        ParameterMap::new()
            .with("infile", self.input_file.as_path())
            .with("basename", basename.as_path())
            .with("classes", self.tissue_classes)
            .with("bias_field", true)
            .with("probability_maps", true)
    }

    fn details(&self, _ctx: &InvocationContext) -> MetadataDetails {
        MetadataDetails::Fast {
            tissue_classes: self.tissue_classes,
        }
    }

    fn shape(
        &self,
        _ctx: &InvocationContext,
        outputs: &WrapperOutputs,
    ) -> Result<ToolOutputs, MissingOutput> {
        let segmented_image = outputs
            .path("outfile")
            .ok_or_else(|| MissingOutput("outfile".to_string()))?
            .to_path_buf();

        Ok(ToolOutputs::Fast(FastOutputs {
            segmented_image,
            tissue_maps: outputs.paths("tissue_maps").to_vec(),
            bias_field: outputs.path("bias_field").map(|p| p.to_path_buf()),
        }))
    }
}
