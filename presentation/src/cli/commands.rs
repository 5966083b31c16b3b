//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for neuroimaging-mcp
#[derive(Parser, Debug)]
#[command(name = "neuroimaging-mcp")]
#[command(author, version, about = "MCP server for FSL, MRTrix3 and FreeSurfer tools")]
#[command(long_about = r#"
neuroimaging-mcp exposes neuroimaging command-line tools to MCP clients over
stdio: FSL BET, FAST and FLIRT, MRTrix3 dwi2fod and FreeSurfer recon-all.
Tools run inside docker or podman images, or directly from PATH.

Configuration files are loaded from (in priority order):
1. NEUROIMAGING_* environment variables (e.g. NEUROIMAGING_RUNTIME__KIND=podman)
2. --config <path>          Explicit config file
3. ./neuroimaging.toml      Project-level config
4. ~/.config/neuroimaging-mcp/config.toml   Global config

Example:
  neuroimaging-mcp                       # serve over stdio
  neuroimaging-mcp tools --json
  neuroimaging-mcp call fsl_bet_brain_extraction --args '{"input_file": "/data/t1.nii.gz"}'
  neuroimaging-mcp guide diffusion
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Write diagnostics to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Serve tools, resources and prompts over stdio (default)
    Serve,

    /// List the available tools
    Tools {
        /// Print the JSON schemas advertised to clients
        #[arg(long)]
        json: bool,
    },

    /// Run one tool call and print the response
    Call {
        /// Registered tool name (e.g. fsl_bet_brain_extraction)
        tool: String,

        /// Arguments as a JSON object
        #[arg(long, value_name = "JSON", default_value = "{}")]
        args: String,
    },

    /// Print the analysis guide for an analysis type
    Guide {
        /// brain_extraction, preprocessing or diffusion
        analysis_type: String,
    },

    /// List the files in a session workspace
    Workspace {
        session_id: String,

        /// Create the workspace directory first
        #[arg(long)]
        create: bool,
    },
}

impl Cli {
    /// Subcommand to run; no subcommand means serve
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_serve() {
        let cli = Cli::parse_from(["neuroimaging-mcp"]);
        assert_eq!(cli.command(), Command::Serve);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.no_config);
    }

    #[test]
    fn test_call_with_args() {
        let cli = Cli::parse_from([
            "neuroimaging-mcp",
            "-vv",
            "call",
            "mrtrix_dwi2fod",
            "--args",
            r#"{"algorithm": "msmt_csd"}"#,
        ]);

        assert_eq!(cli.verbose, 2);
        assert_eq!(
            cli.command(),
            Command::Call {
                tool: "mrtrix_dwi2fod".to_string(),
                args: r#"{"algorithm": "msmt_csd"}"#.to_string(),
            }
        );
    }

    #[test]
    fn test_call_args_default_to_empty_object() {
        let cli = Cli::parse_from(["neuroimaging-mcp", "call", "fsl_fast_segmentation"]);
        assert!(matches!(cli.command(), Command::Call { args, .. } if args == "{}"));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "neuroimaging-mcp",
            "workspace",
            "session-1",
            "--create",
            "--config",
            "/etc/neuro.toml",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("/etc/neuro.toml")));
        assert_eq!(
            cli.command(),
            Command::Workspace {
                session_id: "session-1".to_string(),
                create: true,
            }
        );
    }
}
