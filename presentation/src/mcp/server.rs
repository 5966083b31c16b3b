//! MCP server handler
//!
//! Routes `tools/*`, `resources/*` and `prompts/*` requests to the
//! application use cases. Argument problems the caller can fix become
//! `invalid_params` errors; tool failures become error results carrying the
//! full cause chain.

use crate::mcp::catalog;
use crate::output::formatter::{format_error_chain, format_result, format_tool_failure};
use neuro_application::{
    DescribeWorkspaceUseCase, RunToolUseCase, ToolSchemaPort, ToolWrapperPort, WorkspacePort,
};
use neuro_domain::{ToolRequest, ToolSpec, analysis_guide};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, GetPromptRequestParam, GetPromptResult,
    Implementation, JsonObject, ListPromptsResult, ListResourceTemplatesResult, ListToolsResult,
    PaginatedRequestParam, ReadResourceRequestParam, ReadResourceResult, ServerCapabilities,
    ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler};
use std::sync::Arc;
use tracing::{debug, info, warn};

const INSTRUCTIONS: &str = "Neuroimaging tools (FSL BET, FAST, FLIRT, MRTrix3 dwi2fod, \
FreeSurfer recon-all). All paths are absolute paths on the server host. Use the \
neuroimaging_analysis_guide prompt for workflow guidance.";

/// MCP server exposing the neuroimaging tools.
pub struct NeuroimagingServer<W: ToolWrapperPort + 'static, P: WorkspacePort + 'static> {
    run_tool: Arc<RunToolUseCase<W>>,
    workspaces: Arc<DescribeWorkspaceUseCase<P>>,
    schema: Arc<dyn ToolSchemaPort>,
    spec: ToolSpec,
}

impl<W: ToolWrapperPort + 'static, P: WorkspacePort + 'static> NeuroimagingServer<W, P> {
    pub fn new(
        run_tool: Arc<RunToolUseCase<W>>,
        workspaces: Arc<DescribeWorkspaceUseCase<P>>,
        schema: Arc<dyn ToolSchemaPort>,
        spec: ToolSpec,
    ) -> Self {
        Self {
            run_tool,
            workspaces,
            schema,
            spec,
        }
    }

    /// Tool list as advertised in `tools/list`
    pub fn tools(&self) -> Vec<Tool> {
        self.spec
            .all()
            .map(|definition| {
                let schema = self.schema.tool_to_schema(definition);
                let input_schema = match schema.get("input_schema") {
                    Some(serde_json::Value::Object(map)) => map.clone(),
                    _ => JsonObject::new(),
                };
                Tool::new(
                    definition.name.clone(),
                    definition.description.clone(),
                    Arc::new(input_schema),
                )
            })
            .collect()
    }

    /// Run one tool call.
    ///
    /// Unknown tools and malformed arguments are protocol errors. Failures
    /// while running the tool are reported as an error result.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, McpError> {
        let arguments = arguments
            .map(serde_json::Value::Object)
            .unwrap_or(serde_json::Value::Null);
        let request = ToolRequest::from_call(name, arguments)
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

        info!(tool = %request.tool(), "Tool call");

        let text = match self.run_tool.execute(&request).await {
            Ok(result) => format_result(&result).map_err(|e| {
                format!("{} produced a result that cannot be encoded: {}", result.tool(), e)
            }),
            Err(e) => {
                warn!(tool = %e.tool(), kind = e.kind(), error = %e, "Tool call failed");
                Err(format_tool_failure(&e))
            }
        };

        Ok(match text {
            Ok(body) => CallToolResult::success(vec![Content::text(body)]),
            Err(message) => CallToolResult::error(vec![Content::text(message)]),
        })
    }

    /// Read a `neuroimaging://workspace/{session_id}` resource
    pub async fn read_workspace(&self, uri: &str) -> Result<ReadResourceResult, McpError> {
        let session_id = catalog::session_from_uri(uri).ok_or_else(|| {
            McpError::resource_not_found(format!("Unknown resource: {}", uri), None)
        })?;

        let listing = self.workspaces.execute(session_id).await.map_err(|e| {
            if e.is_caller_error() {
                McpError::invalid_params(e.to_string(), None)
            } else {
                McpError::internal_error(format_error_chain(&e), None)
            }
        })?;

        debug!(session = session_id, exists = listing.exists(), "Workspace read");
        Ok(catalog::workspace_contents(uri, listing.render()))
    }

    /// Render the `neuroimaging_analysis_guide` prompt
    pub fn guide(&self, name: &str, arguments: Option<&JsonObject>) -> Result<GetPromptResult, McpError> {
        if name != catalog::GUIDE_PROMPT {
            return Err(McpError::invalid_params(
                format!("Unknown prompt: {}", name),
                None,
            ));
        }

        let analysis_type = arguments
            .and_then(|args| args.get(catalog::GUIDE_ARGUMENT))
            .and_then(|value| value.as_str())
            .ok_or_else(|| {
                McpError::invalid_params(
                    format!("Missing required argument: {}", catalog::GUIDE_ARGUMENT),
                    None,
                )
            })?;

        Ok(catalog::guide_message(analysis_guide(analysis_type)))
    }
}

impl<W: ToolWrapperPort + 'static, P: WorkspacePort + 'static> ServerHandler
    for NeuroimagingServer<W, P>
{
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.call(&request.name, request.arguments).await
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        Ok(ListResourceTemplatesResult::with_all_items(vec![
            catalog::workspace_template(),
        ]))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        self.read_workspace(&request.uri).await
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        Ok(ListPromptsResult::with_all_items(vec![catalog::guide_prompt()]))
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        self.guide(&request.name, request.arguments.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use neuro_application::{WorkspaceError, WrapperError};
    use neuro_domain::{
        ExecutionRuntime, InvocationContext, NeuroTool, ParameterMap, RuntimeState, SessionId,
        ToolDefinition, WorkspaceListing, WrapperOutputs, default_tool_spec,
    };
    use rmcp::model::ErrorCode;
    use serde_json::json;
    use std::path::PathBuf;

    struct EchoWrapper;

    #[async_trait]
    impl ToolWrapperPort for EchoWrapper {
        async fn execute(
            &self,
            _runtime: &ExecutionRuntime,
            _tool: NeuroTool,
            params: &ParameterMap,
        ) -> Result<WrapperOutputs, WrapperError> {
            let outfile = params.get_str("maskfile").unwrap_or("/out/x.nii.gz");
            Ok(WrapperOutputs::new().with_path("outfile", outfile))
        }
    }

    struct FixedWorkspaces;

    #[async_trait]
    impl WorkspacePort for FixedWorkspaces {
        async fn list(&self, session: &SessionId) -> Result<WorkspaceListing, WorkspaceError> {
            if session.as_str() == "s1" {
                Ok(WorkspaceListing::found(
                    session.clone(),
                    vec!["b.nii.gz".to_string(), "a.nii.gz".to_string()],
                ))
            } else {
                Ok(WorkspaceListing::not_found(session.clone()))
            }
        }

        async fn create(&self, _session: &SessionId) -> Result<PathBuf, WorkspaceError> {
            Ok(PathBuf::from("/tmp/ws"))
        }
    }

    struct PlainSchema;

    impl ToolSchemaPort for PlainSchema {
        fn tool_to_schema(&self, tool: &ToolDefinition) -> serde_json::Value {
            json!({
                "name": tool.name,
                "description": tool.description,
                "input_schema": {"type": "object"},
            })
        }

        fn all_tools_schema(&self, spec: &ToolSpec) -> Vec<serde_json::Value> {
            spec.all().map(|t| self.tool_to_schema(t)).collect()
        }
    }

    fn server(output_dir: &std::path::Path) -> NeuroimagingServer<EchoWrapper, FixedWorkspaces> {
        let run_tool = RunToolUseCase::new(
            Arc::new(EchoWrapper),
            RuntimeState::Ready(ExecutionRuntime::local()),
            InvocationContext::new(output_dir, output_dir.join("subjects")),
        );
        NeuroimagingServer::new(
            Arc::new(run_tool),
            Arc::new(DescribeWorkspaceUseCase::new(Arc::new(FixedWorkspaces))),
            Arc::new(PlainSchema),
            default_tool_spec(),
        )
    }

    fn args(value: serde_json::Value) -> Option<JsonObject> {
        match value {
            serde_json::Value::Object(map) => Some(map),
            _ => None,
        }
    }

    fn result_json(result: &CallToolResult) -> serde_json::Value {
        serde_json::to_value(result).unwrap()
    }

    #[test]
    fn test_tools_lists_all_five() {
        let dir = tempfile::tempdir().unwrap();
        let tools = server(dir.path()).tools();

        let names: Vec<String> = tools.iter().map(|t| t.name.to_string()).collect();
        assert_eq!(names.len(), 5);
        assert!(names.contains(&"freesurfer_recon_all".to_string()));
        assert!(names.contains(&"fsl_bet_brain_extraction".to_string()));
    }

    #[tokio::test]
    async fn test_call_success_returns_response_map() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("t1.nii.gz");
        std::fs::write(&input, b"").unwrap();
        let out = dir.path().join("out");

        let result = server(&out)
            .call(
                "fsl_bet_brain_extraction",
                args(json!({"input_file": input, "output_prefix": "brain"})),
            )
            .await
            .unwrap();

        let json = result_json(&result);
        assert_ne!(json["isError"], true);
        let text = json["content"][0]["text"].as_str().unwrap();
        let body: serde_json::Value = serde_json::from_str(text).unwrap();
        assert_eq!(body["metadata"]["tool"], "FSL BET");
        assert_eq!(body["metadata"]["container"], "local");
        assert!(body["brain_image"].as_str().unwrap().ends_with("brain.nii.gz"));
    }

    #[tokio::test]
    async fn test_call_missing_input_is_error_result() {
        let dir = tempfile::tempdir().unwrap();
        let result = server(dir.path())
            .call(
                "fsl_bet_brain_extraction",
                args(json!({"input_file": "/nonexistent/t1.nii.gz"})),
            )
            .await
            .unwrap();

        let json = result_json(&result);
        assert_eq!(json["isError"], true);
        assert_eq!(
            json["content"][0]["text"],
            "FSL BET: Input file not found: /nonexistent/t1.nii.gz"
        );
    }

    #[tokio::test]
    async fn test_unknown_tool_is_invalid_params() {
        let dir = tempfile::tempdir().unwrap();
        let err = server(dir.path()).call("fsl_melodic", None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("fsl_melodic"));
    }

    #[tokio::test]
    async fn test_bad_arguments_are_invalid_params() {
        let dir = tempfile::tempdir().unwrap();
        let err = server(dir.path())
            .call("fsl_fast_segmentation", args(json!({"input_file": 42})))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_read_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(dir.path());

        let found = server.read_workspace("neuroimaging://workspace/s1").await.unwrap();
        let json = serde_json::to_value(found).unwrap();
        assert_eq!(
            json["contents"][0]["text"],
            "Workspace s1:\nFiles:\n- a.nii.gz\n- b.nii.gz"
        );

        let missing = server.read_workspace("neuroimaging://workspace/s2").await.unwrap();
        let json = serde_json::to_value(missing).unwrap();
        assert_eq!(json["contents"][0]["text"], "Workspace s2 not found");
    }

    #[tokio::test]
    async fn test_read_workspace_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let err = server(dir.path())
            .read_workspace("neuroimaging://workspace/..")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_read_unknown_resource() {
        let dir = tempfile::tempdir().unwrap();
        let err = server(dir.path())
            .read_workspace("file:///etc/passwd")
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RESOURCE_NOT_FOUND);
    }

    #[test]
    fn test_guide_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(dir.path());

        let known = server
            .guide(catalog::GUIDE_PROMPT, args(json!({"analysis_type": "diffusion"})).as_ref())
            .unwrap();
        let json = serde_json::to_value(known).unwrap();
        assert!(
            json["messages"][0]["content"]["text"]
                .as_str()
                .unwrap()
                .contains("dwi2fod")
        );

        let unknown = server
            .guide(catalog::GUIDE_PROMPT, args(json!({"analysis_type": "fmri"})).as_ref())
            .unwrap();
        let json = serde_json::to_value(unknown).unwrap();
        assert_eq!(
            json["messages"][0]["content"]["text"],
            "Unknown analysis type. Available types: brain_extraction, preprocessing, diffusion"
        );
    }

    #[test]
    fn test_guide_requires_argument() {
        let dir = tempfile::tempdir().unwrap();
        let server = server(dir.path());

        let err = server.guide(catalog::GUIDE_PROMPT, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);

        let err = server.guide("other_prompt", None).unwrap_err();
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    }
}
