//! Use cases for the application layer

pub mod describe_workspace;
pub mod run_tool;
pub mod validate_inputs;
