//! De-duplicating work queue with per-key exclusivity.
//!
//! A key is in at most one of three places: waiting in `queue`, being
//! processed, or both "processing" and "dirty" when it was re-added mid-flight.
//! A dirty key is queued again only once its worker calls `done`, so two
//! workers never hold the same key.

use crate::cluster::ReconcileRequest;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct QueueState {
    queue: VecDeque<ReconcileRequest>,
    dirty: HashSet<ReconcileRequest>,
    processing: HashSet<ReconcileRequest>,
    failures: HashMap<ReconcileRequest, u32>,
    shutting_down: bool,
}

#[derive(Debug, Default)]
pub struct WorkQueue {
    state: Mutex<QueueState>,
    available: Notify,
}

impl WorkQueue {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add(&self, request: ReconcileRequest) {
        let mut state = self.state.lock();
        if state.shutting_down || state.dirty.contains(&request) {
            return;
        }
        state.dirty.insert(request.clone());
        if state.processing.contains(&request) {
            return;
        }
        state.queue.push_back(request);
        drop(state);
        self.available.notify_one();
    }

    /// Add the request once `delay` has elapsed
    pub fn add_after(self: &Arc<Self>, request: ReconcileRequest, delay: Duration) {
        if delay.is_zero() {
            self.add(request);
            return;
        }
        let queue = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            queue.add(request);
        });
    }

    /// Wait for the next request. Returns `None` once the queue is shut down.
    pub async fn next(&self) -> Option<ReconcileRequest> {
        loop {
            let notified = self.available.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.state.lock();
                if state.shutting_down {
                    return None;
                }
                if let Some(request) = state.queue.pop_front() {
                    state.dirty.remove(&request);
                    state.processing.insert(request.clone());
                    if !state.queue.is_empty() {
                        self.available.notify_one();
                    }
                    return Some(request);
                }
            }

            notified.await;
        }
    }

    /// Release the key; a re-add that arrived while processing is queued now
    pub fn done(&self, request: &ReconcileRequest) {
        let mut state = self.state.lock();
        state.processing.remove(request);
        if state.dirty.contains(request) && !state.shutting_down {
            state.queue.push_back(request.clone());
            drop(state);
            self.available.notify_one();
        }
    }

    /// Count one more failed attempt and return the running total
    pub fn record_failure(&self, request: &ReconcileRequest) -> u32 {
        let mut state = self.state.lock();
        let count = state.failures.entry(request.clone()).or_insert(0);
        *count += 1;
        *count
    }

    pub fn requeue_count(&self, request: &ReconcileRequest) -> u32 {
        self.state.lock().failures.get(request).copied().unwrap_or(0)
    }

    /// Clear the failure history for the key
    pub fn forget(&self, request: &ReconcileRequest) {
        self.state.lock().failures.remove(request);
    }

    pub fn len(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stop handing out work and wake every waiting worker
    pub fn shutdown(&self) {
        self.state.lock().shutting_down = true;
        self.available.notify_waiters();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.state.lock().shutting_down
    }
}
