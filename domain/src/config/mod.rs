//! Configuration issue reporting.
//!
//! Config loading lives in the infrastructure layer; the types describing a
//! detected problem live here so every layer can report them the same way.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A container image for a tool family is empty.
    EmptyImage { family: String },
    /// A path that is mounted or shared across sessions is relative.
    RelativePath { field: String },
    /// A configured value is not one of the accepted values.
    InvalidEnumValue {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_constructors() {
        let warning = ConfigIssue::warning(
            ConfigIssueCode::RelativePath {
                field: "paths.workspace_root".to_string(),
            },
            "relative",
        );
        assert!(!warning.is_error());

        let error = ConfigIssue::error(
            ConfigIssueCode::EmptyImage {
                family: "fsl".to_string(),
            },
            "empty",
        );
        assert!(error.is_error());
        assert_eq!(error.message, "empty");
    }
}
