//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod invocation_logger;
pub mod tool_schema;
pub mod tool_wrapper;
pub mod workspace;
