//! Interactive REPL for Formally MAD
//!
//! Every line the user types starts one debate turn: the workers propose
//! tools, the resolver picks one, the coordinator runs it, until the
//! coordinator answers.

mod session;

pub use session::{ReplSession, SlashResult};

use eyre::{Context, Result};

use crate::config::Config;
use crate::debate::Debate;
use crate::llm::create_client;

/// Run the interactive REPL
///
/// This is the main entry point for `fm chat`.
pub async fn run_interactive(config: &Config, verbose: bool) -> Result<()> {
    config.validate()?;

    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    let root = std::env::current_dir()?;
    let debate = Debate::from_config(config, llm, root.clone())?;

    let mut session = ReplSession::new(debate, root, verbose);
    session.run().await
}
