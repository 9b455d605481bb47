//! `ClusterClient` wrapper whose list calls can be made to fail.

use async_trait::async_trait;
use notify_core::cluster::{ClusterClient, InMemoryCluster};
use notify_core::error::ClusterError;
use notify_core::models::{ClusterEvent, EventSubscription, Notifier, ObjectKey};
use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFailure {
    /// Return `Unavailable`
    Error,
    /// Panic inside the call
    Panic,
}

/// Delegates to an `InMemoryCluster`, failing the next `n` `list_notifiers` calls
#[derive(Debug)]
pub struct FlakyListCluster {
    inner: InMemoryCluster,
    failure: ListFailure,
    remaining: Mutex<u32>,
    list_calls: Mutex<u32>,
}

impl FlakyListCluster {
    pub fn new(inner: InMemoryCluster, failure: ListFailure, failures: u32) -> Self {
        Self {
            inner,
            failure,
            remaining: Mutex::new(failures),
            list_calls: Mutex::new(0),
        }
    }

    pub fn list_calls(&self) -> u32 {
        *self.list_calls.lock()
    }
}

#[async_trait]
impl ClusterClient for FlakyListCluster {
    async fn get_notifier(&self, key: &ObjectKey) -> Result<Option<Notifier>, ClusterError> {
        self.inner.get_notifier(key).await
    }

    async fn get_subscription(&self, key: &ObjectKey) -> Result<Option<EventSubscription>, ClusterError> {
        self.inner.get_subscription(key).await
    }

    async fn get_event(&self, key: &ObjectKey) -> Result<Option<ClusterEvent>, ClusterError> {
        self.inner.get_event(key).await
    }

    async fn update_notifier(&self, notifier: &Notifier) -> Result<Notifier, ClusterError> {
        self.inner.update_notifier(notifier).await
    }

    async fn update_subscription(
        &self,
        subscription: &EventSubscription,
    ) -> Result<EventSubscription, ClusterError> {
        self.inner.update_subscription(subscription).await
    }

    async fn list_notifiers(&self) -> Result<Vec<Notifier>, ClusterError> {
        *self.list_calls.lock() += 1;
        let fail = {
            let mut remaining = self.remaining.lock();
            let fail = *remaining > 0;
            if fail {
                *remaining -= 1;
            }
            fail
        };
        match (fail, self.failure) {
            (false, _) => self.inner.list_notifiers().await,
            (true, ListFailure::Error) => Err(ClusterError::Unavailable("list timed out".to_string())),
            (true, ListFailure::Panic) => panic!("list_notifiers blew up"),
        }
    }

    async fn list_subscriptions(&self) -> Result<Vec<EventSubscription>, ClusterError> {
        self.inner.list_subscriptions().await
    }
}
