//! Execution runtime detection
//!
//! Resolves the configured runtime into a [`RuntimeState`] once, at
//! startup. Failures are logged and kept in the state; they never stop the
//! server.

use crate::config::FileRuntimeConfig;
use neuro_domain::{ContainerImages, ExecutionRuntime, NeuroTool, RuntimeKind, RuntimeState};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Configure the runtime described by `[runtime]`, looking binaries up on `PATH`.
pub fn configure_runtime(config: &FileRuntimeConfig) -> RuntimeState {
    match config.requested_kind() {
        Ok(kind) => configure_with(kind, &config.images, |name| which::which(name)),
        Err(reason) => {
            warn!(kind = %config.kind, "Execution runtime not configured: {}", reason);
            RuntimeState::NotConfigured
        }
    }
}

/// Configure a runtime with an injectable binary lookup.
pub fn configure_with<F>(
    kind: Option<RuntimeKind>,
    images: &ContainerImages,
    lookup: F,
) -> RuntimeState
where
    F: Fn(&str) -> Result<PathBuf, which::Error>,
{
    let Some(kind) = kind else {
        info!("Tool execution disabled (runtime.kind = none)");
        return RuntimeState::NotConfigured;
    };

    let state = match kind {
        RuntimeKind::Docker | RuntimeKind::Podman => match lookup(kind.as_str()) {
            Ok(engine) => {
                RuntimeState::Ready(ExecutionRuntime::container(kind, engine, images.clone()))
            }
            Err(e) => RuntimeState::Failed {
                kind,
                reason: format!("{} not found on PATH: {}", kind, e),
            },
        },
        RuntimeKind::Local => {
            let found: Vec<&str> = NeuroTool::ALL
                .iter()
                .map(|tool| tool.program())
                .filter(|program| {
                    let available = lookup(*program).is_ok();
                    debug!(program, available, "Checked local tool");
                    available
                })
                .collect();

            if found.is_empty() {
                RuntimeState::Failed {
                    kind,
                    reason: "no neuroimaging programs (bet, fast, flirt, dwi2fod, recon-all) found on PATH"
                        .to_string(),
                }
            } else {
                RuntimeState::Ready(ExecutionRuntime::local())
            }
        }
    };

    match &state {
        RuntimeState::Ready(_) => info!(runtime = %state.describe(), "Execution runtime ready"),
        RuntimeState::Failed { reason, .. } => {
            warn!(kind = %kind, "Execution runtime unavailable: {}", reason)
        }
        RuntimeState::NotConfigured => {}
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found(name: &str) -> Result<PathBuf, which::Error> {
        Ok(PathBuf::from("/usr/bin").join(name))
    }

    fn missing(_name: &str) -> Result<PathBuf, which::Error> {
        Err(which::Error::CannotFindBinaryPath)
    }

    #[test]
    fn test_docker_found() {
        let state = configure_with(Some(RuntimeKind::Docker), &ContainerImages::default(), found);
        let runtime = state.ready().unwrap();
        assert_eq!(runtime.engine, Some(PathBuf::from("/usr/bin/docker")));
        assert_eq!(
            runtime.image_for(NeuroTool::ReconAll),
            Some("freesurfer/freesurfer:7.4.1")
        );
    }

    #[test]
    fn test_podman_missing_fails_with_reason() {
        let state = configure_with(Some(RuntimeKind::Podman), &ContainerImages::default(), missing);
        match state {
            RuntimeState::Failed { kind, reason } => {
                assert_eq!(kind, RuntimeKind::Podman);
                assert!(reason.starts_with("podman not found on PATH"));
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn test_local_needs_at_least_one_program() {
        let images = ContainerImages::default();
        assert!(configure_with(Some(RuntimeKind::Local), &images, missing).ready().is_none());

        let only_bet = |name: &str| {
            if name == "bet" { found(name) } else { missing(name) }
        };
        let state = configure_with(Some(RuntimeKind::Local), &images, only_bet);
        assert_eq!(state, RuntimeState::Ready(ExecutionRuntime::local()));
    }

    #[test]
    fn test_none_is_not_configured() {
        let state = configure_with(None, &ContainerImages::default(), found);
        assert_eq!(state, RuntimeState::NotConfigured);
    }

    #[test]
    fn test_invalid_kind_is_not_configured() {
        let config = FileRuntimeConfig {
            kind: "singularity".to_string(),
            ..Default::default()
        };
        assert_eq!(configure_runtime(&config), RuntimeState::NotConfigured);
    }
}
