//! Agents
//!
//! Workers nominate actions; the coordinator executes the winning one.

mod coordinator;
mod error;
mod pool;
mod proposer;
mod worker;

pub use coordinator::CoordinatorAgent;
pub use error::AgentError;
pub use pool::collect_proposals;
pub use proposer::{Nomination, Proposer, parse_nomination};
pub use worker::WorkerAgent;
