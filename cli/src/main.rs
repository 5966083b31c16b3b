//! CLI entrypoint for neuroimaging-mcp
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use neuro_application::{
    DescribeWorkspaceUseCase, InvocationLogger, RunToolUseCase, ToolSchemaPort,
};
use neuro_domain::{ToolRequest, analysis_guide, default_tool_spec};
use neuro_infrastructure::{
    ConfigLoader, ContainerToolWrapper, FileConfig, JsonSchemaToolConverter,
    JsonlInvocationLogger, LocalWorkspace, configure_runtime,
};
use neuro_presentation::{
    Cli, Command, ConsoleFormatter, NeuroimagingServer, format_result, format_tool_failure,
};
use rmcp::ServiceExt;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr (stdout carries the MCP stream) or to `--log-file`
fn init_tracing(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let filter = if std::env::var_os("RUST_LOG").is_some() {
        EnvFilter::from_default_env()
    } else {
        match cli.verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"), // -vvv or more
        }
    };

    match &cli.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow::anyhow!("failed to load configuration: {}", e))?
    };

    for issue in config.validate()? {
        warn!("Config: {}", issue.message);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let _guard = init_tracing(&cli)?;
    let config = load_config(&cli)?;

    info!("Starting neuroimaging-mcp");

    // === Dependency Injection ===
    let runtime = configure_runtime(&config.runtime);
    info!(runtime = %runtime.describe(), "Execution runtime");

    let mut run_tool = RunToolUseCase::new(
        Arc::new(ContainerToolWrapper::new()),
        runtime,
        config.invocation_context(),
    );
    if let Some(path) = &config.logging.invocation_log {
        match JsonlInvocationLogger::open(path) {
            Ok(logger) => {
                run_tool = run_tool.with_logger(Arc::new(logger) as Arc<dyn InvocationLogger>)
            }
            Err(e) => warn!(path = %path.display(), error = %e, "Invocation log disabled"),
        }
    }
    let run_tool = Arc::new(run_tool);

    let workspaces = Arc::new(DescribeWorkspaceUseCase::new(Arc::new(LocalWorkspace::new(
        &config.paths.workspace_root,
    ))));
    let schema: Arc<dyn ToolSchemaPort> = Arc::new(JsonSchemaToolConverter);
    let spec = default_tool_spec();

    match cli.command() {
        Command::Serve => {
            let server = NeuroimagingServer::new(run_tool, workspaces, schema, spec);
            info!("Serving MCP over stdio");
            let service = server.serve(rmcp::transport::stdio()).await?;
            service.waiting().await?;
        }
        Command::Tools { json } => {
            if json {
                let schemas = schema.all_tools_schema(&spec);
                println!("{}", serde_json::to_string_pretty(&schemas)?);
            } else {
                println!("{}", ConsoleFormatter::format_runtime(run_tool.runtime()));
                println!();
                print!("{}", ConsoleFormatter::format_tool_list(&spec));
            }
        }
        Command::Call { tool, args } => {
            let arguments: serde_json::Value =
                serde_json::from_str(&args).context("--args must be a JSON object")?;
            let request = ToolRequest::from_call(&tool, arguments)?;

            match run_tool.execute(&request).await {
                Ok(result) => println!("{}", format_result(&result)?),
                Err(e) => {
                    eprintln!("{}", ConsoleFormatter::format_error(&format_tool_failure(&e)));
                    bail!("{} call failed", tool);
                }
            }
        }
        Command::Guide { analysis_type } => {
            println!("{}", analysis_guide(&analysis_type));
        }
        Command::Workspace { session_id, create } => {
            if create {
                let dir = workspaces.create(&session_id).await?;
                info!(dir = %dir.display(), "Workspace ready");
            }
            println!("{}", workspaces.execute(&session_id).await?.render());
        }
    }

    Ok(())
}
