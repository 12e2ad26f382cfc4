//! Prompt Loader
//!
//! Loads prompt templates from the override directory or falls back to
//! embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::{debug, info};

use super::embedded;
use crate::llm::ToolDefinition;

/// A tool as listed in the worker prompt
#[derive(Debug, Clone, Serialize)]
pub struct ToolSummary {
    pub name: String,
    pub description: String,
}

impl From<&ToolDefinition> for ToolSummary {
    fn from(def: &ToolDefinition) -> Self {
        Self {
            name: def.name.clone(),
            description: def.description.clone(),
        }
    }
}

/// Context for rendering the worker prompt
#[derive(Debug, Clone, Serialize)]
pub struct WorkerPromptContext {
    /// Tools the worker may nominate
    pub tools: Vec<ToolSummary>,
    /// Action meaning "answer without a tool"
    pub skip_action: String,
    /// Worker-specific instructions appended to the prompt
    pub extra_prompt: Option<String>,
}

impl WorkerPromptContext {
    pub fn new(tools: &[ToolDefinition], skip_action: &str, extra_prompt: Option<String>) -> Self {
        debug!(tool_count = tools.len(), %skip_action, "WorkerPromptContext::new: called");
        Self {
            tools: tools.iter().map(ToolSummary::from).collect(),
            skip_action: skip_action.to_string(),
            extra_prompt,
        }
    }
}

/// Context for rendering the coordinator prompt
#[derive(Debug, Clone, Serialize)]
pub struct CoordinatorPromptContext {
    /// Directory the tools operate in
    pub root: String,
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// User override directory (e.g., `.formallymad/prompts/`)
    user_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a prompt loader rooted at the working directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        debug!(?root, "PromptLoader::new: called");
        let user_dir = root.join(".formallymad/prompts");
        let user_dir_exists = user_dir.exists();
        debug!(?user_dir, %user_dir_exists, "PromptLoader::new: checking override directory");

        Self {
            hbs: Self::engine(),
            user_dir: user_dir_exists.then_some(user_dir),
        }
    }

    /// Create a loader that only uses embedded prompts (for testing)
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Self::engine(),
            user_dir: None,
        }
    }

    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        // prompts are plain text, not HTML
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Load a template by name
    ///
    /// Checks the user override `.formallymad/prompts/{name}.pmt` first,
    /// then the embedded fallback.
    fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        if let Some(ref user_dir) = self.user_dir {
            let path = user_dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found in user override");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read user prompt {}: {}", path.display(), e));
            }
            debug!(?path, "PromptLoader::load_template: not found in user override");
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!(%name, "PromptLoader::load_template: found in embedded");
            return Ok(content.to_string());
        }

        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render<C: Serialize>(&self, template_name: &str, context: &C) -> Result<String> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;
        info!("Rendering template '{}'", template_name);
        self.hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }

    /// Render the worker system prompt
    pub fn worker_prompt(&self, context: &WorkerPromptContext) -> Result<String> {
        debug!("PromptLoader::worker_prompt: called");
        self.render("worker", context)
    }

    /// Render the coordinator system prompt
    pub fn coordinator_prompt(&self, context: &CoordinatorPromptContext) -> Result<String> {
        debug!("PromptLoader::coordinator_prompt: called");
        self.render("coordinator", context)
    }
}
