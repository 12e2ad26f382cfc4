//! Debate loop
//!
//! One user turn runs rounds of: collect worker proposals, resolve them to a
//! single action, let the coordinator execute it, broadcast the result.

mod engine;
mod error;
mod observer;
mod stats;

pub use engine::{Debate, TurnOutcome};
pub use error::DebateError;
pub use observer::{DebateObserver, SilentObserver};
pub use stats::DebateStats;
