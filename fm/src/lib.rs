//! Formally MAD
//!
//! Several LLM workers each nominate a tool for the user's request. Their
//! nominations become a quantitative bipolar argumentation framework that is
//! settled over many sampled orderings; the most robust action wins and the
//! coordinator executes it.
//!
//! # Modules
//!
//! - [`qbaf`] - Argumentation frameworks, gradual semantics, gradient oracle
//! - [`resolver`] - Proposals to a winning action and proposer influence
//! - [`agent`] - Worker proposers and the tool-calling coordinator
//! - [`debate`] - The propose, resolve, execute loop for one user turn
//! - [`llm`] - LLM client trait and OpenAI implementation
//! - [`tools`] - Sandboxed file tools
//! - [`prompts`] - Handlebars prompt templates
//! - [`config`] - Configuration types and loading
//! - [`cli`], [`repl`], [`ui`] - Command line, interactive session, rendering

pub mod agent;
pub mod cli;
pub mod config;
pub mod debate;
pub mod llm;
pub mod prompts;
pub mod qbaf;
pub mod repl;
pub mod resolver;
pub mod tools;
pub mod ui;
