//! Concurrent proposal collection

use futures::{StreamExt, TryStreamExt, stream};
use tracing::debug;

use super::{AgentError, Proposer};
use crate::resolver::Proposal;

/// Ask every proposer for a nomination, at most `concurrency` at a time
///
/// Proposals are returned in completion order, which becomes the natural
/// ordering for resolution. `concurrency` 0 means one slot per proposer.
/// The first failure fails the whole round.
pub async fn collect_proposals(
    proposers: &mut [Box<dyn Proposer>],
    concurrency: usize,
) -> Result<Vec<Proposal>, AgentError> {
    let slots = match concurrency {
        0 => proposers.len().max(1),
        n => n,
    };
    debug!(proposers = proposers.len(), %slots, "collect_proposals: called");

    stream::iter(proposers.iter_mut())
        .map(|proposer| async move {
            let nomination = proposer.propose().await?;
            Ok::<_, AgentError>(Proposal::new(proposer.id(), nomination.action, nomination.motivation))
        })
        .buffer_unordered(slots)
        .try_collect()
        .await
}
