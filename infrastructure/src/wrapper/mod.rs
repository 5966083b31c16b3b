//! Tool wrapper adapter
//!
//! Implements [`ToolWrapperPort`](neuro_application::ToolWrapperPort) by
//! building each program's command line and running it through the
//! configured execution runtime.

mod commands;
mod container;

pub use commands::{ToolCommand, build_command};
pub use container::ContainerToolWrapper;
