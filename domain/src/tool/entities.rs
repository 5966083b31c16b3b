//! Tool domain entities

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::core::error::DomainError;

/// Software suite a tool belongs to.
///
/// Each family runs from its own container image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolFamily {
    Fsl,
    Mrtrix3,
    FreeSurfer,
}

impl ToolFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolFamily::Fsl => "fsl",
            ToolFamily::Mrtrix3 => "mrtrix3",
            ToolFamily::FreeSurfer => "freesurfer",
        }
    }
}

impl std::fmt::Display for ToolFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The fixed set of neuroimaging tools exposed over RPC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NeuroTool {
    /// FSL BET brain extraction
    Bet,
    /// FSL FAST tissue segmentation
    Fast,
    /// FSL FLIRT linear registration
    Flirt,
    /// MRTrix3 fiber orientation distribution estimation
    Dwi2Fod,
    /// FreeSurfer cortical reconstruction
    ReconAll,
}

impl NeuroTool {
    pub const ALL: [NeuroTool; 5] = [
        NeuroTool::Bet,
        NeuroTool::Fast,
        NeuroTool::Flirt,
        NeuroTool::Dwi2Fod,
        NeuroTool::ReconAll,
    ];

    /// Stable name the tool is registered under in the RPC registry
    pub fn rpc_name(&self) -> &'static str {
        match self {
            NeuroTool::Bet => "fsl_bet_brain_extraction",
            NeuroTool::Fast => "fsl_fast_segmentation",
            NeuroTool::Flirt => "fsl_flirt_registration",
            NeuroTool::Dwi2Fod => "mrtrix_dwi2fod",
            NeuroTool::ReconAll => "freesurfer_recon_all",
        }
    }

    /// Name recorded in result metadata and error messages
    pub fn display_name(&self) -> &'static str {
        match self {
            NeuroTool::Bet => "FSL BET",
            NeuroTool::Fast => "FSL FAST",
            NeuroTool::Flirt => "FSL FLIRT",
            NeuroTool::Dwi2Fod => "MRTrix3 dwi2fod",
            NeuroTool::ReconAll => "FreeSurfer recon-all",
        }
    }

    /// Executable name inside the tool's container
    pub fn program(&self) -> &'static str {
        match self {
            NeuroTool::Bet => "bet",
            NeuroTool::Fast => "fast",
            NeuroTool::Flirt => "flirt",
            NeuroTool::Dwi2Fod => "dwi2fod",
            NeuroTool::ReconAll => "recon-all",
        }
    }

    pub fn family(&self) -> ToolFamily {
        match self {
            NeuroTool::Bet | NeuroTool::Fast | NeuroTool::Flirt => ToolFamily::Fsl,
            NeuroTool::Dwi2Fod => ToolFamily::Mrtrix3,
            NeuroTool::ReconAll => ToolFamily::FreeSurfer,
        }
    }
}

impl std::fmt::Display for NeuroTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for NeuroTool {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NeuroTool::ALL
            .into_iter()
            .find(|tool| tool.rpc_name() == s)
            .ok_or_else(|| DomainError::UnknownTool(s.to_string()))
    }
}

impl Serialize for NeuroTool {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.display_name())
    }
}

/// Definition of a tool as advertised to RPC clients
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    /// Tool this definition describes
    #[serde(skip)]
    pub tool: NeuroTool,
    /// Registered name (e.g., "fsl_bet_brain_extraction")
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Parameter specifications
    pub parameters: Vec<ToolParameter>,
}

/// Parameter specification for a tool
#[derive(Debug, Clone, Serialize)]
pub struct ToolParameter {
    /// Parameter name
    pub name: String,
    /// Parameter description
    pub description: String,
    /// Whether this parameter is required
    pub required: bool,
    /// Parameter type hint (e.g., "string", "path", "number", "integer", "boolean")
    pub param_type: String,
    /// Value used when the caller omits the parameter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Accepted values, when the parameter is an enumeration
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
}

impl ToolDefinition {
    pub fn new(tool: NeuroTool, description: impl Into<String>) -> Self {
        Self {
            tool,
            name: tool.rpc_name().to_string(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn required_parameters(&self) -> impl Iterator<Item = &ToolParameter> {
        self.parameters.iter().filter(|p| p.required)
    }
}

impl ToolParameter {
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: "string".to_string(),
            default: None,
            allowed_values: Vec::new(),
        }
    }

    pub fn with_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = param_type.into();
        self
    }

    pub fn with_default(mut self, default: impl Into<serde_json::Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_allowed_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_values = values.into_iter().map(Into::into).collect();
        self
    }
}

/// Catalog of tools offered to RPC clients
#[derive(Debug, Clone, Default)]
pub struct ToolSpec {
    tools: BTreeMap<String, ToolDefinition>,
}

impl ToolSpec {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    pub fn register(mut self, tool: ToolDefinition) -> Self {
        self.tools.insert(tool.name.clone(), tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    /// All definitions, sorted by registered name
    pub fn all(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.values()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_names_round_trip_through_from_str() {
        for tool in NeuroTool::ALL {
            assert_eq!(tool.rpc_name().parse::<NeuroTool>().unwrap(), tool);
        }
        assert!(matches!(
            "fsl_melodic".parse::<NeuroTool>(),
            Err(DomainError::UnknownTool(name)) if name == "fsl_melodic"
        ));
    }

    #[test]
    fn test_tool_families() {
        assert_eq!(NeuroTool::Bet.family(), ToolFamily::Fsl);
        assert_eq!(NeuroTool::Flirt.family(), ToolFamily::Fsl);
        assert_eq!(NeuroTool::Dwi2Fod.family(), ToolFamily::Mrtrix3);
        assert_eq!(NeuroTool::ReconAll.family(), ToolFamily::FreeSurfer);
    }

    #[test]
    fn test_tool_serializes_as_display_name() {
        let json = serde_json::to_value(NeuroTool::Dwi2Fod).unwrap();
        assert_eq!(json, "MRTrix3 dwi2fod");
    }

    #[test]
    fn test_tool_definition() {
        let tool = ToolDefinition::new(NeuroTool::Bet, "Extract brain")
            .with_parameter(ToolParameter::new("input_file", "T1 image", true).with_type("path"))
            .with_parameter(
                ToolParameter::new("fractional_intensity", "Threshold", false)
                    .with_type("number")
                    .with_default(0.5),
            );

        assert_eq!(tool.name, "fsl_bet_brain_extraction");
        assert_eq!(tool.parameters.len(), 2);
        assert_eq!(tool.required_parameters().count(), 1);
        assert_eq!(tool.parameters[1].default, Some(serde_json::json!(0.5)));
    }

    #[test]
    fn test_tool_spec_is_sorted() {
        let spec = ToolSpec::new()
            .register(ToolDefinition::new(NeuroTool::ReconAll, "recon"))
            .register(ToolDefinition::new(NeuroTool::Bet, "bet"));

        let names: Vec<&str> = spec.all().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["freesurfer_recon_all", "fsl_bet_brain_extraction"]);
        assert!(spec.get("fsl_bet_brain_extraction").is_some());
        assert!(spec.get("unknown").is_none());
        assert_eq!(spec.len(), 2);
    }
}
