#![allow(dead_code)]

pub mod builders;
pub mod flaky_cluster;
pub mod recording_transport;
pub mod strategies;

pub use builders::*;
pub use flaky_cluster::*;
pub use recording_transport::*;

use notify_core::events::{ControllerEvent, ReconcileOutcome};
use std::time::Duration;
use tokio::sync::broadcast;

/// Wait for the first published outcome satisfying `predicate`
pub async fn wait_for_outcome<F>(
    receiver: &mut broadcast::Receiver<ControllerEvent>,
    predicate: F,
) -> ControllerEvent
where
    F: Fn(&ControllerEvent) -> bool,
{
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            match receiver.recv().await {
                Ok(event) if predicate(&event) => return event,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => panic!("publisher closed"),
            }
        }
    })
    .await
    .expect("timed out waiting for controller outcome")
}

pub fn is_dropped(event: &ControllerEvent) -> bool {
    matches!(event.outcome, ReconcileOutcome::Dropped { .. })
}

pub fn is_reconciled(event: &ControllerEvent) -> bool {
    matches!(event.outcome, ReconcileOutcome::Reconciled)
}
