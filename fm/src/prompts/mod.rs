//! Prompt Template System
//!
//! Loads and renders `.pmt` (prompt template) files for the worker and
//! coordinator agents.
//!
//! Template loading chain:
//! 1. `.formallymad/prompts/{name}.pmt` (user override)
//! 2. Embedded fallback in code
//!
//! Templates use Handlebars syntax for variable substitution.

pub mod embedded;
mod loader;

pub use loader::{CoordinatorPromptContext, PromptLoader, ToolSummary, WorkerPromptContext};
