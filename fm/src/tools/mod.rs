//! Tool system
//!
//! Tools are the actions workers nominate. Only the coordinator executes
//! them, through a `ToolContext` that scopes file access to the working
//! directory.

mod context;
mod error;
mod executor;
mod traits;

pub mod builtin;

pub use context::ToolContext;
pub use error::ToolError;
pub use executor::ToolExecutor;
pub use traits::{Tool, ToolResult};

/// Reserved action meaning "answer without calling a tool"
pub const SKIP_ACTION: &str = "no_tool";
