//! Filesystem-backed session workspaces
//!
//! Each session owns `<root>/<session_id>`. Workspaces are created on
//! demand and only ever read here; nothing removes them.

use async_trait::async_trait;
use neuro_application::{WorkspaceError, WorkspacePort};
use neuro_domain::{SessionId, WorkspaceListing};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct LocalWorkspace {
    root: PathBuf,
}

impl LocalWorkspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn session_dir(&self, session: &SessionId) -> PathBuf {
        self.root.join(session.as_str())
    }
}

/// Names of the direct entries of `dir`
fn entry_names(dir: &Path) -> Result<Vec<String>, WorkspaceError> {
    let read_error = |source| WorkspaceError::Read {
        path: dir.to_path_buf(),
        source,
    };

    let pattern = format!("{}/*", glob::Pattern::escape(&dir.to_string_lossy()));
    let options = glob::MatchOptions {
        require_literal_leading_dot: false,
        ..Default::default()
    };
    let paths = glob::glob_with(&pattern, options).map_err(|e| {
        read_error(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
    })?;

    let mut names = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| read_error(e.into_error()))?;
        if let Some(name) = path.file_name() {
            names.push(name.to_string_lossy().into_owned());
        }
    }
    Ok(names)
}

#[async_trait]
impl WorkspacePort for LocalWorkspace {
    async fn list(&self, session: &SessionId) -> Result<WorkspaceListing, WorkspaceError> {
        let dir = self.session_dir(session);
        if !tokio::fs::try_exists(&dir).await.unwrap_or(false) {
            debug!(session = %session, dir = %dir.display(), "Workspace not found");
            return Ok(WorkspaceListing::not_found(session.clone()));
        }

        let listing_dir = dir.clone();
        let names = tokio::task::spawn_blocking(move || entry_names(&listing_dir))
            .await
            .map_err(|e| WorkspaceError::Read {
                path: dir.clone(),
                source: std::io::Error::other(e),
            })??;

        Ok(WorkspaceListing::found(session.clone(), names))
    }

    async fn create(&self, session: &SessionId) -> Result<PathBuf, WorkspaceError> {
        let dir = self.session_dir(session);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| WorkspaceError::Create {
                path: dir.clone(),
                source,
            })?;
        debug!(session = %session, dir = %dir.display(), "Workspace ready");
        Ok(dir)
    }
}
