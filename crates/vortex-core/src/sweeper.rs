//! Periodic removal of spent and expired join tokens.
//!
//! Expiry is otherwise only checked when a token is redeemed, so a
//! long-running node uses this task to keep its token table bounded.

use crate::node::Node;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Shortest period the sweeper runs at.
pub const MIN_SWEEP_PERIOD: Duration = Duration::from_secs(1);

/// Spawn a task that prunes `node`'s tokens every `period` until `cancel`
/// fires.
///
/// Periods below [`MIN_SWEEP_PERIOD`] are raised to it.
pub fn spawn_token_sweeper(
    node: Arc<Node>,
    period: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let period = period.max(MIN_SWEEP_PERIOD);

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!(node_id = %node.id(), period_secs = period.as_secs(), "Token sweeper started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {
                    let removed = node.prune_tokens().await;
                    if removed > 0 {
                        debug!(node_id = %node.id(), removed, "Pruned join tokens");
                    }
                }
            }
        }

        info!(node_id = %node.id(), "Token sweeper stopped");
    })
}
