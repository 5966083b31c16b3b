//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("Unknown analysis type: {0}")]
    UnknownAnalysisType(String),

    #[error("Invalid session id '{0}'")]
    InvalidSessionId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tool_display() {
        let error = DomainError::UnknownTool("fsl_melodic".to_string());
        assert_eq!(error.to_string(), "Unknown tool: fsl_melodic");
    }

    #[test]
    fn test_invalid_arguments_display() {
        let error = DomainError::InvalidArguments {
            tool: "fsl_bet_brain_extraction".to_string(),
            message: "missing field `input_file`".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid arguments for fsl_bet_brain_extraction: missing field `input_file`"
        );
    }
}
