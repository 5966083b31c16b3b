//! Tool results: the immutable outcome of one successful invocation
//!
//! A [`ToolResult`] renders as the response map returned over RPC: the
//! tool's named outputs at the top level, plus a `metadata` record.
//!
//! ```json
//! {
//!   "brain_image": "/data/outputs/brain_extracted.nii.gz",
//!   "brain_mask": "/data/outputs/brain_extracted_mask.nii.gz",
//!   "metadata": {
//!     "tool": "FSL BET",
//!     "parameters": { "infile": "...", "fractional_intensity": 0.5, ... },
//!     "container": "docker: brainlife/fsl:6.0.4-patched2",
//!     "fractional_intensity": 0.5
//!   }
//! }
//! ```

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::entities::NeuroTool;
use super::parameters::ParameterMap;
use super::dwi2fod::FodAlgorithm;

/// Outputs of FSL BET
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BetOutputs {
    pub brain_image: PathBuf,
    /// Present only when a binary mask was requested and produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brain_mask: Option<PathBuf>,
}

/// Outputs of FSL FAST
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FastOutputs {
    pub segmented_image: PathBuf,
    /// Partial volume map per tissue class
    pub tissue_maps: Vec<PathBuf>,
    pub bias_field: Option<PathBuf>,
}

/// Outputs of FSL FLIRT
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlirtOutputs {
    pub registered_image: PathBuf,
    pub transformation_matrix: Option<PathBuf>,
}

/// Outputs of MRTrix3 dwi2fod
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dwi2FodOutputs {
    pub fod_image: PathBuf,
}

/// Left and right cortical surfaces under `<subject>/surf`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorticalSurfaces {
    pub left_pial: PathBuf,
    pub right_pial: PathBuf,
    pub left_white: PathBuf,
    pub right_white: PathBuf,
}

/// Standard volume maps under `<subject>/mri`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeMaps {
    pub brain: PathBuf,
    pub aseg: PathBuf,
    pub aparc: PathBuf,
}

/// Outputs of FreeSurfer recon-all.
///
/// These paths follow FreeSurfer's directory layout and are predicted, not
/// inspected: nothing checks that the files exist after the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconAllOutputs {
    pub subject_directory: PathBuf,
    pub surfaces: CorticalSurfaces,
    pub volumes: VolumeMaps,
}

/// Tool-specific outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ToolOutputs {
    Bet(BetOutputs),
    Fast(FastOutputs),
    Flirt(FlirtOutputs),
    Dwi2Fod(Dwi2FodOutputs),
    ReconAll(ReconAllOutputs),
}

impl ToolOutputs {
    /// Flatten into logical output name → path.
    ///
    /// List outputs are numbered (`tissue_map_0`, `tissue_map_1`, ...);
    /// grouped outputs use their member names.
    pub fn paths(&self) -> BTreeMap<String, PathBuf> {
        let mut paths = BTreeMap::new();
        match self {
            ToolOutputs::Bet(o) => {
                paths.insert("brain_image".to_string(), o.brain_image.clone());
                if let Some(mask) = &o.brain_mask {
                    paths.insert("brain_mask".to_string(), mask.clone());
                }
            }
            ToolOutputs::Fast(o) => {
                paths.insert("segmented_image".to_string(), o.segmented_image.clone());
                for (i, map) in o.tissue_maps.iter().enumerate() {
                    paths.insert(format!("tissue_map_{}", i), map.clone());
                }
                if let Some(bias) = &o.bias_field {
                    paths.insert("bias_field".to_string(), bias.clone());
                }
            }
            ToolOutputs::Flirt(o) => {
                paths.insert("registered_image".to_string(), o.registered_image.clone());
                if let Some(matrix) = &o.transformation_matrix {
                    paths.insert("transformation_matrix".to_string(), matrix.clone());
                }
            }
            ToolOutputs::Dwi2Fod(o) => {
                paths.insert("fod_image".to_string(), o.fod_image.clone());
            }
            ToolOutputs::ReconAll(o) => {
                paths.insert("subject_directory".to_string(), o.subject_directory.clone());
                let s = &o.surfaces;
                paths.insert("left_pial".to_string(), s.left_pial.clone());
                paths.insert("right_pial".to_string(), s.right_pial.clone());
                paths.insert("left_white".to_string(), s.left_white.clone());
                paths.insert("right_white".to_string(), s.right_white.clone());
                let v = &o.volumes;
                paths.insert("brain".to_string(), v.brain.clone());
                paths.insert("aseg".to_string(), v.aseg.clone());
                paths.insert("aparc".to_string(), v.aparc.clone());
            }
        }
        paths
    }
}

/// Tool-specific descriptive fields in the metadata record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetadataDetails {
    Bet {
        fractional_intensity: f64,
    },
    Fast {
        tissue_classes: u32,
    },
    Flirt {
        dof: i64,
        cost: String,
    },
    Dwi2Fod {
        algorithm: FodAlgorithm,
    },
    ReconAll {
        subject_id: String,
        subjects_dir: PathBuf,
    },
}

/// Metadata record describing how a result was produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolMetadata {
    /// Display name of the invoked tool
    pub tool: NeuroTool,
    /// Exactly the mapping passed to the tool wrapper
    pub parameters: ParameterMap,
    /// Execution environment the tool ran in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    #[serde(flatten)]
    pub details: MetadataDetails,
}

/// Outcome of one successful tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResult {
    #[serde(flatten)]
    outputs: ToolOutputs,
    metadata: ToolMetadata,
}

impl ToolResult {
    pub fn new(outputs: ToolOutputs, metadata: ToolMetadata) -> Self {
        Self { outputs, metadata }
    }

    pub fn tool(&self) -> NeuroTool {
        self.metadata.tool
    }

    pub fn outputs(&self) -> &ToolOutputs {
        &self.outputs
    }

    pub fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    /// Logical output name → filesystem path
    pub fn output_paths(&self) -> BTreeMap<String, PathBuf> {
        self.outputs.paths()
    }

    /// Response map as sent to RPC clients.
    ///
    /// Fails when an output path is not valid UTF-8.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
