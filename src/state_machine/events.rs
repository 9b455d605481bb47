use serde::{Deserialize, Serialize};

/// Events that move an object through its finalizer lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// The controller persisted its finalizer on a live object
    FinalizerAdded,
    /// The platform set the deletion timestamp
    DeletionRequested,
    /// The controller unregistered the object and persisted the finalizer removal
    FinalizerReleased,
}

impl LifecycleEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::FinalizerAdded => "finalizer_added",
            Self::DeletionRequested => "deletion_requested",
            Self::FinalizerReleased => "finalizer_released",
        }
    }
}

/// What the lifecycle reconciler must do for an observed state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleStep {
    /// Persist the finalizer, then upsert the routing entry
    AddFinalizerThenRegister,
    /// Upsert the routing entry (replace, never merge)
    Register,
    /// Remove the routing entry, then persist the finalizer removal
    UnregisterThenRelease,
    /// Remove any routing entry; nothing to persist
    Unregister,
}
