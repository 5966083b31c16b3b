//! Per-session workspaces exposed as `neuroimaging://workspace/{session_id}`

use serde::Serialize;

use crate::core::error::DomainError;

/// Validated session identifier; always a single path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(String);

/// Whether `raw` names exactly one directory entry (no separators or `..`)
pub(crate) fn is_single_component(raw: &str) -> bool {
    !(raw.is_empty()
        || raw == "."
        || raw.contains("..")
        || raw.contains('/')
        || raw.contains('\\')
        || raw.contains('\0'))
}

impl SessionId {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        if !is_single_component(raw) {
            return Err(DomainError::InvalidSessionId(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Contents of one workspace as seen at read time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceListing {
    pub session_id: SessionId,
    /// Entry names sorted ascending; `None` when the workspace does not exist
    pub files: Option<Vec<String>>,
}

impl WorkspaceListing {
    pub fn found(session_id: SessionId, mut files: Vec<String>) -> Self {
        files.sort();
        Self {
            session_id,
            files: Some(files),
        }
    }

    pub fn not_found(session_id: SessionId) -> Self {
        Self {
            session_id,
            files: None,
        }
    }

    pub fn exists(&self) -> bool {
        self.files.is_some()
    }

    /// Text served for the workspace resource
    pub fn render(&self) -> String {
        match &self.files {
            None => format!("Workspace {} not found", self.session_id),
            Some(files) => {
                let list: Vec<String> = files.iter().map(|f| format!("- {}", f)).collect();
                format!("Workspace {}:\nFiles:\n{}", self.session_id, list.join("\n"))
            }
        }
    }
}
