//! Workspace port
//!
//! Access to per-session workspace directories.

use async_trait::async_trait;
use neuro_domain::{SessionId, WorkspaceListing};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("failed to read workspace {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create workspace {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[async_trait]
pub trait WorkspacePort: Send + Sync {
    /// List a workspace's entries; a missing workspace is not an error
    async fn list(&self, session: &SessionId) -> Result<WorkspaceListing, WorkspaceError>;

    /// Create a workspace if absent and return its directory
    async fn create(&self, session: &SessionId) -> Result<PathBuf, WorkspaceError>;
}
