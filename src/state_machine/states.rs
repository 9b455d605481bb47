use crate::models::ObjectMeta;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Finalizer lifecycle of a Notifier or EventSubscription as observed by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Live, finalizer not yet added; a delete now would go unobserved
    ActiveUnfinalized,
    /// Live and guarded by the finalizer
    ActiveFinalized,
    /// Deletion requested, finalizer still blocks collection
    TerminatingFinalized,
    /// Deletion requested and finalizer released; the platform may collect it
    Collectible,
}

impl LifecycleState {
    /// Derive the state from object metadata and the controller's finalizer name
    pub fn observe(meta: &ObjectMeta, finalizer: &str) -> Self {
        match (meta.is_terminating(), meta.has_finalizer(finalizer)) {
            (false, false) => Self::ActiveUnfinalized,
            (false, true) => Self::ActiveFinalized,
            (true, true) => Self::TerminatingFinalized,
            (true, false) => Self::Collectible,
        }
    }

    pub fn is_terminating(&self) -> bool {
        matches!(self, Self::TerminatingFinalized | Self::Collectible)
    }

    pub fn holds_finalizer(&self) -> bool {
        matches!(self, Self::ActiveFinalized | Self::TerminatingFinalized)
    }

    /// Routing entries may only exist for objects in this state
    pub fn is_routable(&self) -> bool {
        matches!(self, Self::ActiveFinalized)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActiveUnfinalized => write!(f, "active_unfinalized"),
            Self::ActiveFinalized => write!(f, "active_finalized"),
            Self::TerminatingFinalized => write!(f, "terminating_finalized"),
            Self::Collectible => write!(f, "collectible"),
        }
    }
}
