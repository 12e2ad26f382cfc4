//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Worker system prompt
pub const WORKER: &str = include_str!("../../prompts/worker.pmt");

/// Coordinator system prompt
pub const COORDINATOR: &str = include_str!("../../prompts/coordinator.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "worker" => Some(WORKER),
        "coordinator" => Some(COORDINATOR),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}
