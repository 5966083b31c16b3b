//! Resource templates and prompts advertised by the server

use neuro_domain::AnalysisType;
use rmcp::model::{
    AnnotateAble, GetPromptResult, Prompt, PromptArgument, PromptMessage, PromptMessageRole,
    RawResourceTemplate, ReadResourceResult, ResourceContents, ResourceTemplate,
};

pub const WORKSPACE_URI_PREFIX: &str = "neuroimaging://workspace/";
pub const WORKSPACE_URI_TEMPLATE: &str = "neuroimaging://workspace/{session_id}";
pub const GUIDE_PROMPT: &str = "neuroimaging_analysis_guide";
pub const GUIDE_ARGUMENT: &str = "analysis_type";

const TEXT_PLAIN: &str = "text/plain";

/// Session id addressed by a workspace URI, if the URI is one
pub fn session_from_uri(uri: &str) -> Option<&str> {
    uri.strip_prefix(WORKSPACE_URI_PREFIX)
}

pub fn workspace_template() -> ResourceTemplate {
    RawResourceTemplate {
        uri_template: WORKSPACE_URI_TEMPLATE.to_string(),
        name: "workspace".to_string(),
        title: None,
        description: Some("Files in a session workspace".to_string()),
        mime_type: Some(TEXT_PLAIN.to_string()),
    }
    .no_annotation()
}

pub fn workspace_contents(uri: &str, text: String) -> ReadResourceResult {
    ReadResourceResult {
        contents: vec![ResourceContents::TextResourceContents {
            uri: uri.to_string(),
            mime_type: Some(TEXT_PLAIN.to_string()),
            text,
            meta: None,
        }],
    }
}

pub fn guide_prompt() -> Prompt {
    let types: Vec<&str> = AnalysisType::ALL.iter().map(|t| t.as_str()).collect();
    Prompt::new(
        GUIDE_PROMPT,
        Some("Workflow guidance for a neuroimaging analysis"),
        Some(vec![PromptArgument {
            name: GUIDE_ARGUMENT.to_string(),
            title: None,
            description: Some(format!("One of: {}", types.join(", "))),
            required: Some(true),
        }]),
    )
}

pub fn guide_message(text: String) -> GetPromptResult {
    GetPromptResult {
        description: Some("Neuroimaging analysis guide".to_string()),
        messages: vec![PromptMessage::new_text(PromptMessageRole::User, text)],
    }
}
