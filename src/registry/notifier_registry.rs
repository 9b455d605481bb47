use crate::models::{BackendConfig, ObjectKey};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Expected outcome when a subscription points at an absent Notifier
    #[error("notifier {0} is not registered")]
    NotifierNotFound(ObjectKey),
}

/// Resolved backend configuration per Notifier
#[derive(Debug, Default)]
pub struct NotifierRegistry {
    backends: HashMap<ObjectKey, BackendConfig>,
}

impl NotifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether an existing entry was replaced
    pub fn upsert(&mut self, key: ObjectKey, backend: BackendConfig) -> bool {
        self.backends.insert(key, backend).is_some()
    }

    pub fn remove(&mut self, key: &ObjectKey) -> bool {
        self.backends.remove(key).is_some()
    }

    pub fn resolve(&self, key: &ObjectKey) -> Result<&BackendConfig, RegistryError> {
        self.backends
            .get(key)
            .ok_or_else(|| RegistryError::NotifierNotFound(key.clone()))
    }

    pub fn contains(&self, key: &ObjectKey) -> bool {
        self.backends.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}
