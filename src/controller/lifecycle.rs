//! # Lifecycle Reconciler
//!
//! Drives Notifier and EventSubscription objects through the finalizer
//! protocol and keeps the routing table in step with them:
//!
//! - the finalizer is persisted before the object is registered, so no routing
//!   entry exists for an object whose deletion could go unobserved
//! - on deletion the entry is removed before the finalizer is released, so
//!   nothing routes to an object the platform may already have collected
//!
//! Every call re-reads the object and derives the owed step from its current
//! metadata, which makes reconciling the same object twice a no-op.

use crate::cluster::ClusterClient;
use crate::error::{ClusterError, ReconcileError, ReconcileResult};
use crate::logging::log_lifecycle_operation;
use crate::models::{EventSubscription, Notifier, ObjectKey, Resource};
use crate::registry::RoutingTable;
use crate::state_machine::{LifecycleEvent, LifecycleState, LifecycleStateMachine, LifecycleStep};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// A finalizer-bearing resource whose presence is mirrored in the routing table
#[async_trait]
pub trait LifecycleResource: Resource + Clone + Send + Sync + Sized + 'static {
    async fn fetch<C>(cluster: &C, key: &ObjectKey) -> Result<Option<Self>, ClusterError>
    where
        C: ClusterClient + ?Sized;

    async fn persist<C>(cluster: &C, object: &Self) -> Result<Self, ClusterError>
    where
        C: ClusterClient + ?Sized;

    /// Insert or replace the routing entry derived from this object
    fn register(&self, routing: &RoutingTable) -> Result<(), String>;

    /// Remove the routing entry for the key, if any
    fn unregister(key: &ObjectKey, routing: &RoutingTable) -> bool;
}

#[async_trait]
impl LifecycleResource for Notifier {
    async fn fetch<C>(cluster: &C, key: &ObjectKey) -> Result<Option<Self>, ClusterError>
    where
        C: ClusterClient + ?Sized,
    {
        cluster.get_notifier(key).await
    }

    async fn persist<C>(cluster: &C, object: &Self) -> Result<Self, ClusterError>
    where
        C: ClusterClient + ?Sized,
    {
        cluster.update_notifier(object).await
    }

    fn register(&self, routing: &RoutingTable) -> Result<(), String> {
        routing.upsert_notifier(self.key(), self.spec.backend.clone());
        Ok(())
    }

    fn unregister(key: &ObjectKey, routing: &RoutingTable) -> bool {
        routing.remove_notifier(key)
    }
}

#[async_trait]
impl LifecycleResource for EventSubscription {
    async fn fetch<C>(cluster: &C, key: &ObjectKey) -> Result<Option<Self>, ClusterError>
    where
        C: ClusterClient + ?Sized,
    {
        cluster.get_subscription(key).await
    }

    async fn persist<C>(cluster: &C, object: &Self) -> Result<Self, ClusterError>
    where
        C: ClusterClient + ?Sized,
    {
        cluster.update_subscription(object).await
    }

    fn register(&self, routing: &RoutingTable) -> Result<(), String> {
        routing
            .upsert_subscription(self)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    fn unregister(key: &ObjectKey, routing: &RoutingTable) -> bool {
        routing.remove_subscription(key)
    }
}

/// What a lifecycle reconcile did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOutcome {
    /// The object no longer exists; any leftover entry was removed
    Absent,
    Registered,
    Released,
    Unregistered,
}

#[derive(Debug, Clone)]
pub struct LifecycleReconciler {
    cluster: Arc<dyn ClusterClient>,
    routing: RoutingTable,
    finalizer: String,
    machine: LifecycleStateMachine,
}

impl LifecycleReconciler {
    pub fn new(cluster: Arc<dyn ClusterClient>, routing: RoutingTable, finalizer: impl Into<String>) -> Self {
        Self {
            cluster,
            routing,
            finalizer: finalizer.into(),
            machine: LifecycleStateMachine,
        }
    }

    pub fn finalizer(&self) -> &str {
        &self.finalizer
    }

    pub async fn reconcile<R: LifecycleResource>(&self, key: &ObjectKey) -> ReconcileResult<LifecycleOutcome> {
        let fetched = R::fetch(self.cluster.as_ref(), key)
            .await
            .map_err(|source| ReconcileError::Read {
                kind: R::KIND,
                key: key.clone(),
                source,
            })?;

        let Some(object) = fetched else {
            if R::unregister(key, &self.routing) {
                debug!(kind = R::KIND, key = %key, "removed routing entry for vanished object");
            }
            return Ok(LifecycleOutcome::Absent);
        };

        let state = LifecycleState::observe(object.metadata(), &self.finalizer);
        match self.machine.plan(state) {
            LifecycleStep::AddFinalizerThenRegister => {
                let next = self.advance::<R>(key, state, LifecycleEvent::FinalizerAdded)?;
                let mut updated = object;
                updated.metadata_mut().add_finalizer(&self.finalizer);
                let persisted = self.persist(key, &updated).await?;
                self.log::<R>(key, "finalizer_added", next);
                self.register(key, &persisted)
            }
            LifecycleStep::Register => self.register(key, &object),
            LifecycleStep::UnregisterThenRelease => {
                let next = self.advance::<R>(key, state, LifecycleEvent::FinalizerReleased)?;
                R::unregister(key, &self.routing);
                let mut updated = object;
                updated.metadata_mut().remove_finalizer(&self.finalizer);
                self.persist(key, &updated).await?;
                self.log::<R>(key, "finalizer_released", next);
                Ok(LifecycleOutcome::Released)
            }
            LifecycleStep::Unregister => {
                R::unregister(key, &self.routing);
                Ok(LifecycleOutcome::Unregistered)
            }
        }
    }

    /// Check a finalizer change against the lifecycle protocol before it is written
    fn advance<R: LifecycleResource>(
        &self,
        key: &ObjectKey,
        state: LifecycleState,
        event: LifecycleEvent,
    ) -> ReconcileResult<LifecycleState> {
        self.machine.transition(state, event).map_err(|source| {
            error!(kind = R::KIND, key = %key, error = %source, "lifecycle protocol violation");
            ReconcileError::Protocol {
                kind: R::KIND,
                key: key.clone(),
                source,
            }
        })
    }

    async fn persist<R: LifecycleResource>(&self, key: &ObjectKey, object: &R) -> ReconcileResult<R> {
        R::persist(self.cluster.as_ref(), object)
            .await
            .map_err(|source| {
                warn!(kind = R::KIND, key = %key, error = %source, "finalizer update failed");
                ReconcileError::Persist {
                    kind: R::KIND,
                    key: key.clone(),
                    source,
                }
            })
    }

    fn register<R: LifecycleResource>(&self, key: &ObjectKey, object: &R) -> ReconcileResult<LifecycleOutcome> {
        object
            .register(&self.routing)
            .map_err(|reason| ReconcileError::InvalidSpec {
                kind: R::KIND,
                key: key.clone(),
                reason,
            })?;
        self.log::<R>(key, "registered", LifecycleState::ActiveFinalized);
        Ok(LifecycleOutcome::Registered)
    }

    fn log<R: LifecycleResource>(&self, key: &ObjectKey, operation: &str, state: LifecycleState) {
        log_lifecycle_operation(
            operation,
            R::KIND,
            &key.namespace,
            &key.name,
            &state.to_string(),
            None,
        );
    }
}
