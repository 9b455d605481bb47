use super::{ClusterClient, ReconcileRequest, ResourceKind};
use crate::error::ClusterError;
use crate::models::{ClusterEvent, EventSubscription, Notifier, ObjectKey, Resource};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
struct ClusterState {
    notifiers: BTreeMap<ObjectKey, Notifier>,
    subscriptions: BTreeMap<ObjectKey, EventSubscription>,
    events: BTreeMap<ObjectKey, ClusterEvent>,
    watchers: Vec<mpsc::UnboundedSender<ReconcileRequest>>,
    next_version: u64,
    failing_updates: u32,
    update_count: u64,
}

impl ClusterState {
    fn bump_version(&mut self) -> u64 {
        self.next_version += 1;
        self.next_version
    }

    fn emit(&mut self, request: ReconcileRequest) {
        self.watchers.retain(|tx| tx.send(request.clone()).is_ok());
    }
}

/// In-process object store with watch notifications
#[derive(Debug, Clone, Default)]
pub struct InMemoryCluster {
    state: Arc<Mutex<ClusterState>>,
}

impl InMemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive a reconcile request for every stored change from now on
    pub fn watch(&self) -> mpsc::UnboundedReceiver<ReconcileRequest> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().watchers.push(tx);
        rx
    }

    /// Create or update a Notifier's spec, as a user applying a manifest would
    pub fn apply_notifier(&self, notifier: Notifier) -> Notifier {
        let mut state = self.state.lock();
        let stored = apply(&mut state, |s| &mut s.notifiers, notifier);
        state.emit(ReconcileRequest::notifier(stored.key()));
        stored
    }

    pub fn apply_subscription(&self, subscription: EventSubscription) -> EventSubscription {
        let mut state = self.state.lock();
        let stored = apply(&mut state, |s| &mut s.subscriptions, subscription);
        state.emit(ReconcileRequest::subscription(stored.key()));
        stored
    }

    /// Request deletion. Returns false when the object does not exist.
    pub fn delete_notifier(&self, key: &ObjectKey) -> bool {
        let mut state = self.state.lock();
        let existed = delete(&mut state, |s| &mut s.notifiers, key);
        if existed {
            state.emit(ReconcileRequest::notifier(key.clone()));
        }
        existed
    }

    pub fn delete_subscription(&self, key: &ObjectKey) -> bool {
        let mut state = self.state.lock();
        let existed = delete(&mut state, |s| &mut s.subscriptions, key);
        if existed {
            state.emit(ReconcileRequest::subscription(key.clone()));
        }
        existed
    }

    /// Store a cluster event and notify watchers
    pub fn record_event(&self, mut event: ClusterEvent) -> ClusterEvent {
        let mut state = self.state.lock();
        event.metadata.resource_version = state.bump_version();
        event.metadata.uid.get_or_insert_with(Uuid::new_v4);
        state.events.insert(event.key(), event.clone());
        state.emit(ReconcileRequest::event(event.key()));
        event
    }

    /// Make the next `count` update calls fail with `Unavailable`
    pub fn fail_next_updates(&self, count: u32) {
        self.state.lock().failing_updates = count;
    }

    /// Successful and failed update calls seen so far
    pub fn update_count(&self) -> u64 {
        self.state.lock().update_count
    }

    pub fn notifier(&self, key: &ObjectKey) -> Option<Notifier> {
        self.state.lock().notifiers.get(key).cloned()
    }

    pub fn subscription(&self, key: &ObjectKey) -> Option<EventSubscription> {
        self.state.lock().subscriptions.get(key).cloned()
    }
}

fn apply<T, F>(state: &mut ClusterState, select: F, mut object: T) -> T
where
    T: Resource + Clone,
    F: Fn(&mut ClusterState) -> &mut BTreeMap<ObjectKey, T>,
{
    let key = object.object_key();
    let version = state.bump_version();

    if let Some(existing) = select(state).get(&key) {
        // Spec changes never touch controller-owned metadata
        let current = existing.metadata().clone();
        let meta = object.metadata_mut();
        meta.uid = current.uid;
        meta.finalizers = current.finalizers;
        meta.deletion_timestamp = current.deletion_timestamp;
    } else {
        let meta = object.metadata_mut();
        meta.uid.get_or_insert_with(Uuid::new_v4);
        meta.finalizers.clear();
        meta.deletion_timestamp = None;
    }
    object.metadata_mut().resource_version = version;

    select(state).insert(key, object.clone());
    object
}

fn delete<T, F>(state: &mut ClusterState, select: F, key: &ObjectKey) -> bool
where
    T: Resource,
    F: Fn(&mut ClusterState) -> &mut BTreeMap<ObjectKey, T>,
{
    let version = state.bump_version();
    let objects = select(state);
    let Some(existing) = objects.get_mut(key) else {
        return false;
    };

    if existing.metadata().finalizers.is_empty() {
        objects.remove(key);
        debug!(kind = T::KIND, key = %key, "object removed");
    } else if !existing.metadata().is_terminating() {
        let meta = existing.metadata_mut();
        meta.deletion_timestamp = Some(Utc::now());
        meta.resource_version = version;
        debug!(kind = T::KIND, key = %key, "deletion requested, waiting on finalizers");
    }
    true
}

fn update<T, F>(state: &mut ClusterState, select: F, object: &T) -> Result<T, ClusterError>
where
    T: Resource + Clone,
    F: Fn(&mut ClusterState) -> &mut BTreeMap<ObjectKey, T>,
{
    state.update_count += 1;
    if state.failing_updates > 0 {
        state.failing_updates -= 1;
        return Err(ClusterError::Unavailable(
            "injected update failure".to_string(),
        ));
    }

    let key = object.object_key();
    let version = state.bump_version();
    let objects = select(state);
    let Some(existing) = objects.get(&key) else {
        return Err(ClusterError::NotFound { kind: T::KIND, key });
    };

    let actual = existing.metadata().resource_version;
    let expected = object.metadata().resource_version;
    if actual != expected {
        return Err(ClusterError::Conflict {
            kind: T::KIND,
            key,
            expected,
            actual,
        });
    }
    if existing.metadata().is_terminating() && object.metadata().deletion_timestamp.is_none() {
        return Err(ClusterError::Rejected {
            kind: T::KIND,
            key,
            reason: "deletion timestamp cannot be cleared".to_string(),
        });
    }

    let mut stored = object.clone();
    stored.metadata_mut().resource_version = version;

    if stored.metadata().is_terminating() && stored.metadata().finalizers.is_empty() {
        objects.remove(&key);
        debug!(kind = T::KIND, key = %key, "finalizers released, object collected");
    } else {
        objects.insert(key, stored.clone());
    }
    Ok(stored)
}

#[async_trait]
impl ClusterClient for InMemoryCluster {
    async fn get_notifier(&self, key: &ObjectKey) -> Result<Option<Notifier>, ClusterError> {
        Ok(self.notifier(key))
    }

    async fn get_subscription(&self, key: &ObjectKey) -> Result<Option<EventSubscription>, ClusterError> {
        Ok(self.subscription(key))
    }

    async fn get_event(&self, key: &ObjectKey) -> Result<Option<ClusterEvent>, ClusterError> {
        Ok(self.state.lock().events.get(key).cloned())
    }

    async fn update_notifier(&self, notifier: &Notifier) -> Result<Notifier, ClusterError> {
        let mut state = self.state.lock();
        let stored = update(&mut state, |s| &mut s.notifiers, notifier)?;
        state.emit(ReconcileRequest::new(ResourceKind::Notifier, stored.key()));
        Ok(stored)
    }

    async fn update_subscription(
        &self,
        subscription: &EventSubscription,
    ) -> Result<EventSubscription, ClusterError> {
        let mut state = self.state.lock();
        let stored = update(&mut state, |s| &mut s.subscriptions, subscription)?;
        state.emit(ReconcileRequest::new(ResourceKind::EventSubscription, stored.key()));
        Ok(stored)
    }

    async fn list_notifiers(&self) -> Result<Vec<Notifier>, ClusterError> {
        Ok(self.state.lock().notifiers.values().cloned().collect())
    }

    async fn list_subscriptions(&self) -> Result<Vec<EventSubscription>, ClusterError> {
        Ok(self.state.lock().subscriptions.values().cloned().collect())
    }
}
