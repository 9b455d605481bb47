//! # Routing Table
//!
//! Owns the SubscriptionIndex and NotifierRegistry behind a single
//! `parking_lot::RwLock`. Lifecycle reconcilers take the write side for one
//! key at a time; event dispatch takes the read side, clones what it needs and
//! releases the lock before any I/O.

use super::notifier_registry::{NotifierRegistry, RegistryError};
use super::subscription_index::{PredicateError, SubscriptionEntry, SubscriptionIndex};
use crate::models::{BackendConfig, ClusterEvent, EventSubscription, ObjectKey};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default)]
struct RoutingState {
    index: SubscriptionIndex,
    registry: NotifierRegistry,
}

/// One matched subscription with its Notifier resolved at match time
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub subscription: ObjectKey,
    pub notifier: ObjectKey,
    pub backend: Result<BackendConfig, RegistryError>,
}

/// Point-in-time counts, for logging and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoutingStats {
    pub subscriptions: usize,
    pub notifiers: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    state: Arc<RwLock<RoutingState>>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile and replace the subscription's entry
    ///
    /// On an invalid predicate any previous entry is removed, so a stale
    /// predicate never stays live.
    pub fn upsert_subscription(&self, subscription: &EventSubscription) -> Result<bool, PredicateError> {
        let id = subscription.key();
        match SubscriptionEntry::from_subscription(subscription) {
            Ok(entry) => {
                let replaced = self.state.write().index.upsert(id.clone(), entry);
                debug!(subscription = %id, replaced, "subscription indexed");
                Ok(replaced)
            }
            Err(e) => {
                self.state.write().index.remove(&id);
                Err(e)
            }
        }
    }

    pub fn remove_subscription(&self, id: &ObjectKey) -> bool {
        self.state.write().index.remove(id)
    }

    pub fn upsert_notifier(&self, key: ObjectKey, backend: BackendConfig) -> bool {
        self.state.write().registry.upsert(key, backend)
    }

    pub fn remove_notifier(&self, key: &ObjectKey) -> bool {
        self.state.write().registry.remove(key)
    }

    pub fn resolve_notifier(&self, key: &ObjectKey) -> Result<BackendConfig, RegistryError> {
        self.state.read().registry.resolve(key).cloned()
    }

    /// Match the event and resolve every matched subscription's Notifier
    /// against one consistent snapshot
    pub fn route(&self, event: &ClusterEvent) -> Vec<Route> {
        let state = self.state.read();
        state
            .index
            .matches(event)
            .into_iter()
            .filter_map(|subscription| {
                let entry = state.index.get(&subscription)?;
                Some(Route {
                    backend: state.registry.resolve(&entry.notifier).cloned(),
                    notifier: entry.notifier.clone(),
                    subscription,
                })
            })
            .collect()
    }

    pub fn contains_subscription(&self, id: &ObjectKey) -> bool {
        self.state.read().index.contains(id)
    }

    pub fn contains_notifier(&self, key: &ObjectKey) -> bool {
        self.state.read().registry.contains(key)
    }

    pub fn stats(&self) -> RoutingStats {
        let state = self.state.read();
        RoutingStats {
            subscriptions: state.index.len(),
            notifiers: state.registry.len(),
        }
    }
}
