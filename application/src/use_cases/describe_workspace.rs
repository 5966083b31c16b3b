//! Workspace resource use case
//!
//! Resolves a raw session identifier from a resource URI into a workspace
//! listing.

use crate::ports::workspace::{WorkspaceError, WorkspacePort};
use neuro_domain::{DomainError, SessionId, WorkspaceListing};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum DescribeWorkspaceError {
    #[error(transparent)]
    InvalidSession(#[from] DomainError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
}

impl DescribeWorkspaceError {
    pub fn is_caller_error(&self) -> bool {
        matches!(self, DescribeWorkspaceError::InvalidSession(_))
    }
}

pub struct DescribeWorkspaceUseCase<P: WorkspacePort + 'static> {
    workspaces: Arc<P>,
}

impl<P: WorkspacePort + 'static> DescribeWorkspaceUseCase<P> {
    pub fn new(workspaces: Arc<P>) -> Self {
        Self { workspaces }
    }

    pub async fn execute(&self, session_id: &str) -> Result<WorkspaceListing, DescribeWorkspaceError> {
        let session = SessionId::parse(session_id)?;
        let listing = self.workspaces.list(&session).await?;
        debug!(session = %session, exists = listing.exists(), "Described workspace");
        Ok(listing)
    }

    /// Create the workspace on demand
    pub async fn create(&self, session_id: &str) -> Result<PathBuf, DescribeWorkspaceError> {
        let session = SessionId::parse(session_id)?;
        Ok(self.workspaces.create(&session).await?)
    }
}
