//! Tool wrapper that launches programs in a container engine or locally

use super::commands::{ToolCommand, build_command};
use async_trait::async_trait;
use neuro_application::{ToolWrapperPort, WrapperError};
use neuro_domain::{ExecutionRuntime, NeuroTool, ParameterMap, WrapperOutputs};
use std::ffi::OsString;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Lines of stderr kept in [`WrapperError::NonZeroExit`]
const DEFAULT_STDERR_TAIL_LINES: usize = 20;

/// Runs tool programs through the configured [`ExecutionRuntime`].
///
/// Container runs use `<engine> run --rm`, bind-mounting every directory a
/// tool touches at the same path inside the container so parameter paths
/// stay valid on both sides.
pub struct ContainerToolWrapper {
    stderr_tail_lines: usize,
}

impl Default for ContainerToolWrapper {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerToolWrapper {
    pub fn new() -> Self {
        Self {
            stderr_tail_lines: DEFAULT_STDERR_TAIL_LINES,
        }
    }

    pub fn with_stderr_tail_lines(mut self, lines: usize) -> Self {
        self.stderr_tail_lines = lines;
        self
    }

    /// Full argv (program first) for `command` under `runtime`
    pub fn argv(runtime: &ExecutionRuntime, tool: NeuroTool, command: &ToolCommand) -> Vec<OsString> {
        let mut argv: Vec<OsString> = Vec::new();

        if let (Some(engine), Some(image)) = (&runtime.engine, runtime.image_for(tool)) {
            argv.push(engine.as_os_str().to_owned());
            argv.push("run".into());
            argv.push("--rm".into());
            if let Some(user) = container_user(runtime) {
                argv.push("--user".into());
                argv.push(user.into());
            }
            for dir in &command.mounts {
                let mut volume = dir.as_os_str().to_owned();
                volume.push(":");
                volume.push(dir.as_os_str());
                argv.push("-v".into());
                argv.push(volume);
            }
            argv.push(image.into());
        }

        argv.push(command.program.into());
        argv.extend(command.args.iter().map(OsString::from));
        argv
    }

    fn stderr_tail(&self, stderr: &[u8]) -> String {
        let text = String::from_utf8_lossy(stderr);
        let lines: Vec<&str> = text.trim_end().lines().collect();
        let start = lines.len().saturating_sub(self.stderr_tail_lines);
        lines[start..].join("\n")
    }
}

/// Docker runs as root by default; run as the calling user so outputs stay
/// owned by them. Rootless podman already maps the user.
fn container_user(runtime: &ExecutionRuntime) -> Option<String> {
    #[cfg(unix)]
    {
        if runtime.kind == neuro_domain::RuntimeKind::Docker {
            // SAFETY: getuid/getgid cannot fail and touch no memory
            let (uid, gid) = unsafe { (libc::getuid(), libc::getgid()) };
            return Some(format!("{}:{}", uid, gid));
        }
    }
    let _ = runtime;
    None
}

#[async_trait]
impl ToolWrapperPort for ContainerToolWrapper {
    async fn execute(
        &self,
        runtime: &ExecutionRuntime,
        tool: NeuroTool,
        params: &ParameterMap,
    ) -> Result<WrapperOutputs, WrapperError> {
        let command = build_command(tool, params)?;
        let argv = Self::argv(runtime, tool, &command);
        let Some((program, args)) = argv.split_first() else {
            return Err(WrapperError::InvalidParameter {
                name: "program".to_string(),
                reason: "empty command line".to_string(),
            });
        };

        debug!(tool = %tool, argv = ?argv, "Launching tool");
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Linux: request kernel to send SIGTERM to child when parent dies.
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        let output = cmd.output().await.map_err(|source| WrapperError::Launch {
            program: program.to_string_lossy().into_owned(),
            source,
        })?;

        if !output.status.success() {
            return Err(WrapperError::NonZeroExit {
                program: command.program.to_string(),
                status: output.status.to_string(),
                stderr: self.stderr_tail(&output.stderr),
            });
        }

        info!(tool = %tool, program = command.program, "Tool program finished");
        Ok(command.outputs)
    }
}
