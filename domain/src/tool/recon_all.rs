//! FreeSurfer recon-all cortical reconstruction

use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

use super::entities::{NeuroTool, ToolDefinition, ToolParameter};
use super::invocation::{InvocationContext, MissingOutput, RequiredInput, ToolInvocation};
use super::outputs::WrapperOutputs;
use super::parameters::ParameterMap;
use super::result::{CorticalSurfaces, MetadataDetails, ReconAllOutputs, ToolOutputs, VolumeMaps};
use crate::workspace::is_single_component;

/// Subject ids name a directory directly under the subjects directory
fn subject_dir_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let id = String::deserialize(deserializer)?;
    if !is_single_component(&id) {
        return Err(serde::de::Error::custom(format!(
            "subject_id '{}' must be a single directory name",
            id
        )));
    }
    Ok(id)
}

/// Arguments of `freesurfer_recon_all`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReconAllRequest {
    pub input_file: PathBuf,
    #[serde(deserialize_with = "subject_dir_name")]
    pub subject_id: String,
    /// Falls back to the server's configured subjects directory
    #[serde(default)]
    pub subjects_dir: Option<PathBuf>,
}

impl ReconAllRequest {
    pub fn new(input_file: impl Into<PathBuf>, subject_id: impl Into<String>) -> Self {
        Self {
            input_file: input_file.into(),
            subject_id: subject_id.into(),
            subjects_dir: None,
        }
    }

    pub fn with_subjects_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.subjects_dir = Some(dir.into());
        self
    }

    pub fn definition() -> ToolDefinition {
        ToolDefinition::new(
            NeuroTool::ReconAll,
            "Run the FreeSurfer recon-all pipeline for complete cortical surface \
             reconstruction and analysis.",
        )
        .with_parameter(
            ToolParameter::new("input_file", "Path to T1-weighted MRI image", true)
                .with_type("path"),
        )
        .with_parameter(ToolParameter::new(
            "subject_id",
            "Subject identifier for FreeSurfer",
            true,
        ))
        .with_parameter(
            ToolParameter::new(
                "subjects_dir",
                "FreeSurfer subjects directory (defaults to the server's configured directory)",
                false,
            )
            .with_type("path"),
        )
    }

    fn subjects_dir<'a>(&'a self, ctx: &'a InvocationContext) -> &'a Path {
        self.subjects_dir.as_deref().unwrap_or(&ctx.subjects_dir)
    }
}

impl ToolInvocation for ReconAllRequest {
    fn tool(&self) -> NeuroTool {
        NeuroTool::ReconAll
    }

    fn required_inputs(&self) -> Vec<RequiredInput> {
        vec![RequiredInput::new("Input file", &self.input_file)]
    }

    fn destination_dir(&self, ctx: &InvocationContext) -> PathBuf {
        self.subjects_dir(ctx).to_path_buf()
    }

    fn parameters(&self, ctx: &InvocationContext) -> ParameterMap {
        ParameterMap::new()
            .with("input_file", self.input_file.as_path())
            .with("subject_id", self.subject_id.as_str())
            .with("subjects_dir", self.subjects_dir(ctx))
            .with("all", true)
    }

    fn details(&self, ctx: &InvocationContext) -> MetadataDetails {
        MetadataDetails::ReconAll {
            subject_id: self.subject_id.clone(),
            subjects_dir: self.subjects_dir(ctx).to_path_buf(),
        }
    }

    /// Outputs follow FreeSurfer's fixed subject layout, whatever the
    /// wrapper reports.
    fn shape(
        &self,
        ctx: &InvocationContext,
        _outputs: &WrapperOutputs,
    ) -> Result<ToolOutputs, MissingOutput> {
        let subject = self.subjects_dir(ctx).join(&self.subject_id);
        let surf = subject.join("surf");
        let mri = subject.join("mri");

        Ok(ToolOutputs::ReconAll(ReconAllOutputs {
            surfaces: CorticalSurfaces {
                left_pial: surf.join("lh.pial"),
                right_pial: surf.join("rh.pial"),
                left_white: surf.join("lh.white"),
                right_white: surf.join("rh.white"),
            },
            volumes: VolumeMaps {
                brain: mri.join("brain.mgz"),
                aseg: mri.join("aseg.mgz"),
                aparc: mri.join("aparc+aseg.mgz"),
            },
            subject_directory: subject,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> InvocationContext {
        InvocationContext::new("/data/outputs", "/data/subjects")
    }

    #[test]
    fn test_subjects_dir_falls_back_to_context() {
        let req = ReconAllRequest::new("/in/t1.nii.gz", "sub-01");
        let params = req.parameters(&ctx());

        assert_eq!(params.get_str("subjects_dir"), Some("/data/subjects"));
        assert_eq!(params.get_str("subject_id"), Some("sub-01"));
        assert!(params.flag("all"));
        assert_eq!(req.destination_dir(&ctx()), PathBuf::from("/data/subjects"));
    }

    #[test]
    fn test_predicted_layout() {
        let req = ReconAllRequest::new("/in/t1.nii.gz", "sub-01").with_subjects_dir("/fs");

        let ToolOutputs::ReconAll(out) = req.shape(&ctx(), &WrapperOutputs::new()).unwrap() else {
            panic!("expected recon-all outputs");
        };
        assert_eq!(out.subject_directory, PathBuf::from("/fs/sub-01"));
        assert_eq!(out.surfaces.left_pial, PathBuf::from("/fs/sub-01/surf/lh.pial"));
        assert_eq!(out.surfaces.right_white, PathBuf::from("/fs/sub-01/surf/rh.white"));
        assert_eq!(out.volumes.brain, PathBuf::from("/fs/sub-01/mri/brain.mgz"));
        assert_eq!(out.volumes.aparc, PathBuf::from("/fs/sub-01/mri/aparc+aseg.mgz"));
    }

    #[test]
    fn test_subject_id_is_required() {
        let result = serde_json::from_value::<ReconAllRequest>(serde_json::json!({
            "input_file": "/in/t1.nii.gz"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_subject_id_must_stay_inside_subjects_dir() {
        for id in ["../escape", "/abs/sub-01", "nested/sub-01", ".."] {
            let result = serde_json::from_value::<ReconAllRequest>(serde_json::json!({
                "input_file": "/in/t1.nii.gz",
                "subject_id": id,
            }));
            let err = result.unwrap_err().to_string();
            assert!(err.contains("single directory name"), "{id}: {err}");
        }

        let ok = serde_json::from_value::<ReconAllRequest>(serde_json::json!({
            "input_file": "/in/t1.nii.gz",
            "subject_id": "sub-01_ses-2",
        }));
        assert_eq!(ok.unwrap().subject_id, "sub-01_ses-2");
    }
}
