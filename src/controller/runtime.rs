//! # Controller Runtime
//!
//! Turns reconcile requests into reconciler calls:
//!
//! ```text
//! watch stream ──feeder──> WorkQueue ──next()──> worker × N ──> reconcile
//!                              ^                                  │
//!                              └────── add_after(backoff) ────────┘
//! ```
//!
//! The queue guarantees a key is held by at most one worker, so reconciles of
//! the same object never overlap while distinct objects proceed in parallel.

use super::backoff::BackoffPolicy;
use super::event_reconciler::EventReconciler;
use super::lifecycle::LifecycleReconciler;
use super::work_queue::WorkQueue;
use crate::cluster::{ClusterClient, ReconcileRequest, ResourceKind};
use crate::error::{ClusterError, ReconcileResult, RequeuePolicy};
use crate::events::{EventPublisher, ReconcileOutcome};
use crate::logging::log_error;
use crate::models::{EventSubscription, Notifier};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct Controller {
    cluster: Arc<dyn ClusterClient>,
    lifecycle: LifecycleReconciler,
    events: EventReconciler,
    queue: Arc<WorkQueue>,
    backoff: BackoffPolicy,
    publisher: EventPublisher,
    worker_count: usize,
}

impl Controller {
    pub fn new(
        cluster: Arc<dyn ClusterClient>,
        lifecycle: LifecycleReconciler,
        events: EventReconciler,
        backoff: BackoffPolicy,
        publisher: EventPublisher,
        worker_count: usize,
    ) -> Self {
        Self {
            cluster,
            lifecycle,
            events,
            queue: WorkQueue::new(),
            backoff,
            publisher,
            worker_count: worker_count.max(1),
        }
    }

    pub fn queue(&self) -> &Arc<WorkQueue> {
        &self.queue
    }

    pub fn publisher(&self) -> &EventPublisher {
        &self.publisher
    }

    /// Events whose settled delivery pairs are still remembered for a retry
    pub fn pending_event_retries(&self) -> usize {
        self.events.pending_retries()
    }

    /// Run one reconcile for the request, dispatching on its kind
    pub async fn reconcile(&self, request: &ReconcileRequest) -> ReconcileResult<()> {
        match request.kind {
            ResourceKind::Notifier => self
                .lifecycle
                .reconcile::<Notifier>(&request.key)
                .await
                .map(|_| ()),
            ResourceKind::EventSubscription => self
                .lifecycle
                .reconcile::<EventSubscription>(&request.key)
                .await
                .map(|_| ()),
            ResourceKind::Event => self.events.reconcile(&request.key).await.map(|_| ()),
        }
    }

    /// Reconcile and apply the requeue policy to the result
    pub async fn process(&self, request: &ReconcileRequest) {
        let result = self.reconcile(request).await;
        self.handle_result(request, result);
    }

    fn handle_result(&self, request: &ReconcileRequest, result: ReconcileResult<()>) {
        let error = match result {
            Ok(()) => {
                self.forget(request);
                self.publisher
                    .publish(request.clone(), ReconcileOutcome::Reconciled);
                return;
            }
            Err(error) => error,
        };

        let attempt = self.queue.record_failure(request);
        let policy = error.requeue_policy();
        let delay = match policy {
            RequeuePolicy::Never => None,
            RequeuePolicy::Immediate if attempt == 1 => Some(Duration::ZERO),
            RequeuePolicy::Immediate => Some(self.backoff.delay(attempt - 1)),
            RequeuePolicy::Backoff if self.backoff.is_exhausted(attempt) => None,
            RequeuePolicy::Backoff => Some(self.backoff.delay(attempt)),
        };

        match delay {
            Some(delay) => {
                warn!(
                    request = %request,
                    attempt,
                    policy = %policy,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "🔁 Reconcile failed, requeueing"
                );
                self.queue.add_after(request.clone(), delay);
                self.publisher.publish(
                    request.clone(),
                    ReconcileOutcome::Requeued {
                        policy,
                        attempt,
                        delay,
                        error: error.to_string(),
                    },
                );
            }
            None => {
                self.forget(request);
                log_error(
                    "controller",
                    "reconcile",
                    &error.to_string(),
                    Some(&format!("{request} dropped after {attempt} attempt(s)")),
                );
                self.publisher.publish(
                    request.clone(),
                    ReconcileOutcome::Dropped {
                        attempts: attempt,
                        error: error.to_string(),
                    },
                );
            }
        }
    }

    /// Clear the failure history kept for a request that will not be retried
    fn forget(&self, request: &ReconcileRequest) {
        self.queue.forget(request);
        if request.kind == ResourceKind::Event {
            self.events.forget(&request.key);
        }
    }

    /// Reconcile every Notifier and EventSubscription, rebuilding the routing
    /// table from scratch. Notifiers go first so subscriptions resolve.
    pub async fn relist(&self) -> Result<usize, ClusterError> {
        let notifiers = self.cluster.list_notifiers().await?;
        let subscriptions = self.cluster.list_subscriptions().await?;
        let total = notifiers.len() + subscriptions.len();

        let requests = notifiers
            .iter()
            .map(|n| ReconcileRequest::notifier(n.key()))
            .chain(
                subscriptions
                    .iter()
                    .map(|s| ReconcileRequest::subscription(s.key())),
            );
        for request in requests {
            self.process(&request).await;
        }

        info!(
            notifiers = notifiers.len(),
            subscriptions = subscriptions.len(),
            "📋 Startup relist complete"
        );
        Ok(total)
    }

    /// Relist until it succeeds, backing off between failures. Returns
    /// `false` if `shutdown` fired first.
    async fn relist_until_ready(&self, shutdown: &CancellationToken) -> bool {
        let mut attempt = 0u32;
        loop {
            let result = tokio::select! {
                _ = shutdown.cancelled() => return false,
                result = self.relist() => result,
            };
            let error = match result {
                Ok(_) => return true,
                Err(error) => error,
            };

            attempt = attempt.saturating_add(1);
            let delay = self.backoff.delay(attempt);
            warn!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "📋 Startup relist failed, retrying"
            );
            tokio::select! {
                _ = shutdown.cancelled() => return false,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Relist, then process requests until `shutdown` is cancelled
    ///
    /// A failing relist is retried with backoff; requests arriving meanwhile
    /// stay buffered in `requests`. In-flight reconciles are dropped on
    /// cancellation, which aborts any outstanding webhook call.
    pub async fn run(
        self: Arc<Self>,
        mut requests: mpsc::UnboundedReceiver<ReconcileRequest>,
        shutdown: CancellationToken,
    ) {
        info!(workers = self.worker_count, "🚀 Controller starting");
        if !self.relist_until_ready(&shutdown).await {
            info!("🛑 Controller stopped before startup relist completed");
            return;
        }

        let feeder = {
            let queue = Arc::clone(&self.queue);
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        request = requests.recv() => match request {
                            Some(request) => queue.add(request),
                            None => {
                                debug!("watch stream closed");
                                break;
                            }
                        },
                    }
                }
            })
        };

        let mut workers = JoinSet::new();
        for worker_id in 0..self.worker_count {
            let controller = Arc::clone(&self);
            let shutdown = shutdown.clone();
            workers.spawn(async move { controller.work(worker_id, shutdown).await });
        }

        shutdown.cancelled().await;
        info!("🛑 Controller shutdown requested");
        self.queue.shutdown();
        feeder.abort();

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "worker task ended abnormally");
            }
        }

        info!("✅ Controller stopped");
    }

    async fn work(&self, worker_id: usize, shutdown: CancellationToken) {
        debug!(worker_id, "worker started");
        while let Some(request) = self.queue.next().await {
            let finished = tokio::select! {
                _ = shutdown.cancelled() => false,
                _ = self.process(&request) => true,
            };
            self.queue.done(&request);
            if !finished {
                break;
            }
        }
        debug!(worker_id, "worker stopped");
    }
}
