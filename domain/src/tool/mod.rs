//! Tool domain module
//!
//! Contains the five neuroimaging tools, their typed requests and the
//! shapes of their results.

pub mod bet;
pub mod dwi2fod;
pub mod entities;
pub mod fast;
pub mod flirt;
pub mod invocation;
pub mod outputs;
pub mod parameters;
pub mod recon_all;
pub mod request;
pub mod result;

pub use bet::BetRequest;
pub use dwi2fod::{Dwi2FodRequest, FodAlgorithm};
pub use fast::FastRequest;
pub use flirt::{FLIRT_COST, FlirtRequest};
pub use recon_all::ReconAllRequest;
pub use request::{ToolRequest, default_tool_spec};
