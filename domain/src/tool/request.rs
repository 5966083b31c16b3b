//! Typed tool requests and the tool catalog

use serde_json::Value;

use super::bet::BetRequest;
use super::dwi2fod::Dwi2FodRequest;
use super::entities::{NeuroTool, ToolSpec};
use super::fast::FastRequest;
use super::flirt::FlirtRequest;
use super::invocation::ToolInvocation;
use super::recon_all::ReconAllRequest;
use crate::core::error::DomainError;

/// One tool call, with its arguments parsed and defaulted.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolRequest {
    Bet(BetRequest),
    Fast(FastRequest),
    Flirt(FlirtRequest),
    Dwi2Fod(Dwi2FodRequest),
    ReconAll(ReconAllRequest),
}

impl ToolRequest {
    /// Parse an RPC call by registered tool name.
    ///
    /// `Value::Null` is treated as an empty argument object.
    pub fn from_call(name: &str, arguments: Value) -> Result<Self, DomainError> {
        let tool: NeuroTool = name.parse()?;
        let arguments = match arguments {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        let invalid = |e: serde_json::Error| DomainError::InvalidArguments {
            tool: tool.rpc_name().to_string(),
            message: e.to_string(),
        };

        let request = match tool {
            NeuroTool::Bet => ToolRequest::Bet(serde_json::from_value(arguments).map_err(invalid)?),
            NeuroTool::Fast => {
                ToolRequest::Fast(serde_json::from_value(arguments).map_err(invalid)?)
            }
            NeuroTool::Flirt => {
                ToolRequest::Flirt(serde_json::from_value(arguments).map_err(invalid)?)
            }
            NeuroTool::Dwi2Fod => {
                ToolRequest::Dwi2Fod(serde_json::from_value(arguments).map_err(invalid)?)
            }
            NeuroTool::ReconAll => {
                ToolRequest::ReconAll(serde_json::from_value(arguments).map_err(invalid)?)
            }
        };
        Ok(request)
    }

    pub fn tool(&self) -> NeuroTool {
        self.invocation().tool()
    }

    /// The per-tool invocation behind this request
    pub fn invocation(&self) -> &dyn ToolInvocation {
        match self {
            ToolRequest::Bet(r) => r,
            ToolRequest::Fast(r) => r,
            ToolRequest::Flirt(r) => r,
            ToolRequest::Dwi2Fod(r) => r,
            ToolRequest::ReconAll(r) => r,
        }
    }
}

/// Catalog of every tool this server exposes
pub fn default_tool_spec() -> ToolSpec {
    ToolSpec::new()
        .register(BetRequest::definition())
        .register(FastRequest::definition())
        .register(FlirtRequest::definition())
        .register(Dwi2FodRequest::definition())
        .register(ReconAllRequest::definition())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_call_dispatches_by_name() {
        let req = ToolRequest::from_call(
            "fsl_flirt_registration",
            json!({"input_file": "/a.nii.gz", "reference_file": "/b.nii.gz"}),
        )
        .unwrap();

        assert_eq!(req.tool(), NeuroTool::Flirt);
        assert!(matches!(req, ToolRequest::Flirt(ref f) if f.dof == 12));
    }

    #[test]
    fn test_from_call_unknown_tool() {
        let err = ToolRequest::from_call("fsl_melodic", json!({})).unwrap_err();
        assert!(matches!(err, DomainError::UnknownTool(_)));
    }

    #[test]
    fn test_from_call_missing_required_argument() {
        let err = ToolRequest::from_call("mrtrix_dwi2fod", Value::Null).unwrap_err();
        match err {
            DomainError::InvalidArguments { tool, message } => {
                assert_eq!(tool, "mrtrix_dwi2fod");
                assert!(message.contains("dwi_file"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_call_wrong_type() {
        let err = ToolRequest::from_call(
            "fsl_fast_segmentation",
            json!({"input_file": "/a.nii.gz", "tissue_classes": "three"}),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidArguments { .. }));
    }

    #[test]
    fn test_from_call_rejects_escaping_subject_id() {
        let err = ToolRequest::from_call(
            "freesurfer_recon_all",
            json!({"input_file": "/in/t1.nii.gz", "subject_id": "../../etc"}),
        )
        .unwrap_err();
        match err {
            DomainError::InvalidArguments { tool, message } => {
                assert_eq!(tool, "freesurfer_recon_all");
                assert!(message.contains("single directory name"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_default_tool_spec_covers_every_tool() {
        let spec = default_tool_spec();
        assert_eq!(spec.len(), NeuroTool::ALL.len());
        for tool in NeuroTool::ALL {
            let def = spec.get(tool.rpc_name()).unwrap();
            assert_eq!(def.tool, tool);
            assert!(def.required_parameters().count() >= 1);
        }
    }
}
