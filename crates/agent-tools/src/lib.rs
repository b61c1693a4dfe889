//! Tool framework for the vnstock agent
//!
//! Tools are the functions the LLM may call. Each one returns either text for
//! the model to read or a typed [`ToolError`] that tells the agent loop whether
//! the failure was a missing record, a transient provider problem, or bad
//! arguments from the model.

pub mod error;
pub mod registry;
pub mod tool;

pub use error::{ToolError, ToolErrorKind, ToolResult};
pub use registry::ToolRegistry;
pub use tool::{Tool, parse_params};
