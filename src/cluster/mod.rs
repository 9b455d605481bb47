//! # Cluster Access
//!
//! The controller reads and updates declarative objects through the
//! `ClusterClient` trait and receives change notifications as
//! `ReconcileRequest`s. Only metadata (finalizers) is ever written back;
//! cluster events are read-only.
//!
//! `InMemoryCluster` is the reference implementation used by tests and local
//! runs. It follows API-server semantics for the parts the controller relies
//! on: resource versions, optimistic concurrency, and finalizer-gated deletion.

pub mod memory;

use crate::constants::kinds;
use crate::error::ClusterError;
use crate::models::{ClusterEvent, EventSubscription, Notifier, ObjectKey};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

pub use memory::InMemoryCluster;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ResourceKind {
    Notifier,
    EventSubscription,
    Event,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Notifier => kinds::NOTIFIER,
            Self::EventSubscription => kinds::EVENT_SUBSCRIPTION,
            Self::Event => kinds::EVENT,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unit of work for the controller: "look at this object again"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ReconcileRequest {
    pub kind: ResourceKind,
    pub key: ObjectKey,
}

impl ReconcileRequest {
    pub fn new(kind: ResourceKind, key: ObjectKey) -> Self {
        Self { kind, key }
    }

    pub fn notifier(key: ObjectKey) -> Self {
        Self::new(ResourceKind::Notifier, key)
    }

    pub fn subscription(key: ObjectKey) -> Self {
        Self::new(ResourceKind::EventSubscription, key)
    }

    pub fn event(key: ObjectKey) -> Self {
        Self::new(ResourceKind::Event, key)
    }
}

impl fmt::Display for ReconcileRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.key)
    }
}

/// Read and metadata-update access to cluster objects
///
/// `get_*` returns `Ok(None)` for absent objects. `update_*` performs an
/// optimistic-concurrency write keyed on `metadata.resource_version` and
/// returns the stored object.
#[async_trait]
pub trait ClusterClient: Send + Sync + fmt::Debug {
    async fn get_notifier(&self, key: &ObjectKey) -> Result<Option<Notifier>, ClusterError>;

    async fn get_subscription(&self, key: &ObjectKey) -> Result<Option<EventSubscription>, ClusterError>;

    async fn get_event(&self, key: &ObjectKey) -> Result<Option<ClusterEvent>, ClusterError>;

    async fn update_notifier(&self, notifier: &Notifier) -> Result<Notifier, ClusterError>;

    async fn update_subscription(
        &self,
        subscription: &EventSubscription,
    ) -> Result<EventSubscription, ClusterError>;

    async fn list_notifiers(&self) -> Result<Vec<Notifier>, ClusterError>;

    async fn list_subscriptions(&self) -> Result<Vec<EventSubscription>, ClusterError>;
}
