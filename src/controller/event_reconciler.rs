//! # Event Reconciler
//!
//! Fans one cluster event out to every matching subscription's Notifier.
//! Matching and notifier resolution happen against one routing snapshot; the
//! lock is released before any delivery I/O starts. Pairs are delivered
//! concurrently.
//!
//! Per (event, subscription) pair:
//!
//! - notifier not registered: skipped and logged, never retried
//! - permanent delivery failure: dropped and logged
//! - retryable delivery failure: counted; once every pair was attempted the
//!   whole event is reported back for a bounded requeue
//!
//! Pairs that were delivered or failed permanently are remembered while their
//! event is being retried and are not posted again. The memory is cleared when
//! the event succeeds, disappears, or is dropped by the runtime (`forget`).

use crate::backend::{DeliveryError, NotifierBackend, WebhookTransport};
use crate::cluster::ClusterClient;
use crate::constants::kinds;
use crate::error::{ReconcileError, ReconcileResult};
use crate::logging::log_delivery_attempt;
use crate::models::{ClusterEvent, ObjectKey};
use crate::registry::{Route, RoutingTable};
use crate::rendering::NotificationRenderer;
use futures::future::join_all;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Per-event delivery tally
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub event: Option<ObjectKey>,
    pub matched: usize,
    pub delivered: usize,
    pub skipped_missing_notifier: usize,
    pub dropped_permanent: usize,
    pub retryable: usize,
    /// Pairs settled by an earlier attempt and not posted again
    pub already_settled: usize,
}

/// (subscription, notifier) pair of one delivery
type Pair = (ObjectKey, ObjectKey);

/// Pairs already delivered or permanently failed, per event under retry
#[derive(Debug, Clone, Default)]
struct SettledPairs {
    inner: Arc<Mutex<HashMap<ObjectKey, HashSet<Pair>>>>,
}

impl SettledPairs {
    fn get(&self, event: &ObjectKey) -> HashSet<Pair> {
        self.inner.lock().get(event).cloned().unwrap_or_default()
    }

    fn extend(&self, event: &ObjectKey, pairs: Vec<Pair>) {
        if pairs.is_empty() {
            return;
        }
        self.inner.lock().entry(event.clone()).or_default().extend(pairs);
    }

    fn clear(&self, event: &ObjectKey) {
        self.inner.lock().remove(event);
    }

    fn tracked(&self) -> usize {
        self.inner.lock().len()
    }
}

#[derive(Debug, Clone)]
pub struct EventReconciler {
    cluster: Arc<dyn ClusterClient>,
    routing: RoutingTable,
    renderer: NotificationRenderer,
    transport: Arc<dyn WebhookTransport>,
    settled: SettledPairs,
}

impl EventReconciler {
    pub fn new(
        cluster: Arc<dyn ClusterClient>,
        routing: RoutingTable,
        renderer: NotificationRenderer,
        transport: Arc<dyn WebhookTransport>,
    ) -> Self {
        Self {
            cluster,
            routing,
            renderer,
            transport,
            settled: SettledPairs::default(),
        }
    }

    /// Discard the settled pairs remembered for `key`
    pub fn forget(&self, key: &ObjectKey) {
        self.settled.clear(key);
    }

    /// Number of events with remembered settled pairs
    pub fn pending_retries(&self) -> usize {
        self.settled.tracked()
    }

    pub async fn reconcile(&self, key: &ObjectKey) -> ReconcileResult<DispatchReport> {
        let event = self
            .cluster
            .get_event(key)
            .await
            .map_err(|source| ReconcileError::Read {
                kind: kinds::EVENT,
                key: key.clone(),
                source,
            })?;

        let Some(event) = event else {
            self.settled.clear(key);
            debug!(event = %key, "event no longer exists, nothing to dispatch");
            return Ok(DispatchReport::default());
        };

        self.dispatch(&event).await
    }

    /// Deliver an already-fetched event to every matching subscription
    pub async fn dispatch(&self, event: &ClusterEvent) -> ReconcileResult<DispatchReport> {
        let key = event.key();
        let routes = self.routing.route(event);
        let mut report = DispatchReport {
            event: Some(key.clone()),
            matched: routes.len(),
            ..DispatchReport::default()
        };
        let mut last_retryable = None;

        let settled = self.settled.get(&key);
        let (done, pending): (Vec<Route>, Vec<Route>) = routes
            .into_iter()
            .partition(|route| settled.contains(&pair_of(route)));
        report.already_settled = done.len();

        let event_key = &key;
        let deliveries = pending.into_iter().map(|route| async move {
            let pair = pair_of(&route);
            (pair, self.deliver_route(event, event_key, route).await)
        });

        let mut newly_settled = Vec::new();
        for (pair, outcome) in join_all(deliveries).await {
            match outcome {
                PairOutcome::Delivered => {
                    report.delivered += 1;
                    newly_settled.push(pair);
                }
                PairOutcome::MissingNotifier => report.skipped_missing_notifier += 1,
                PairOutcome::Failed(DeliveryError::Permanent(_)) => {
                    report.dropped_permanent += 1;
                    newly_settled.push(pair);
                }
                PairOutcome::Failed(error @ DeliveryError::Retryable(_)) => {
                    report.retryable += 1;
                    last_retryable = Some(error.to_string());
                }
            }
        }

        debug!(
            event = %key,
            matched = report.matched,
            delivered = report.delivered,
            skipped = report.skipped_missing_notifier,
            dropped = report.dropped_permanent,
            retryable = report.retryable,
            already_settled = report.already_settled,
            "event dispatched"
        );

        match last_retryable {
            Some(last_error) => {
                self.settled.extend(&key, newly_settled);
                Err(ReconcileError::RetryableDelivery {
                    key,
                    failed: report.retryable,
                    last_error,
                })
            }
            None => {
                self.settled.clear(&key);
                Ok(report)
            }
        }
    }

    async fn deliver_route(&self, event: &ClusterEvent, key: &ObjectKey, route: Route) -> PairOutcome {
        let event_id = key.to_string();
        let subscription = route.subscription.to_string();
        let notifier = route.notifier.to_string();

        let config = match route.backend {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    event = %event_id,
                    subscription = %subscription,
                    error = %e,
                    "subscription references an unregistered notifier, skipping"
                );
                return PairOutcome::MissingNotifier;
            }
        };

        let backend = NotifierBackend::from(config);
        let variant = backend.variant().to_string();
        let payload = backend.render(&self.renderer, event);

        match backend.deliver(self.transport.as_ref(), &payload).await {
            Ok(()) => {
                log_delivery_attempt(&event_id, &subscription, &notifier, &variant, "delivered", None);
                PairOutcome::Delivered
            }
            Err(error) => {
                let status = if error.is_retryable() {
                    "retryable_failure"
                } else {
                    "permanent_failure"
                };
                log_delivery_attempt(
                    &event_id,
                    &subscription,
                    &notifier,
                    &variant,
                    status,
                    Some(&error.to_string()),
                );
                PairOutcome::Failed(error)
            }
        }
    }
}

fn pair_of(route: &Route) -> Pair {
    (route.subscription.clone(), route.notifier.clone())
}

enum PairOutcome {
    Delivered,
    MissingNotifier,
    Failed(DeliveryError),
}
