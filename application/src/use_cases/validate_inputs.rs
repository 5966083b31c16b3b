//! Parameter validation
//!
//! Checks that every required input path exists before a tool is
//! dispatched. The check is presence-only and has no side effects.

use neuro_domain::RequiredInput;
use tracing::debug;

/// Presence checks for a tool's required inputs.
pub struct ParameterValidator;

impl ParameterValidator {
    /// First input, in declaration order, whose path does not exist.
    ///
    /// Paths that cannot be inspected (e.g., permission denied) count as
    /// missing.
    pub async fn first_missing(inputs: &[RequiredInput]) -> Option<&RequiredInput> {
        for input in inputs {
            let exists = matches!(tokio::fs::try_exists(&input.path).await, Ok(true));
            debug!(label = input.label, path = %input.path.display(), exists, "Checked input");
            if !exists {
                return Some(input);
            }
        }
        None
    }
}
