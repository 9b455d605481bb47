//! # Error Taxonomy
//!
//! Every failure in the notification core is scoped to a single reconcile call.
//! Nothing here is process-fatal; errors only decide whether (and how) the
//! reconcile request that produced them is requeued.

use crate::models::ObjectKey;
use crate::state_machine::StateMachineError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors surfaced by the cluster-state collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClusterError {
    #[error("{kind} {key} not found")]
    NotFound { kind: &'static str, key: ObjectKey },

    #[error("conflicting update on {kind} {key}: expected resource version {expected}, found {actual}")]
    Conflict {
        kind: &'static str,
        key: ObjectKey,
        expected: u64,
        actual: u64,
    },

    #[error("cluster API unavailable: {0}")]
    Unavailable(String),

    #[error("update of {kind} {key} rejected: {reason}")]
    Rejected {
        kind: &'static str,
        key: ObjectKey,
        reason: String,
    },
}

/// How the controller runtime should react to a failed reconcile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequeuePolicy {
    /// Retry right away; later retries back off but the key is never dropped
    Immediate,
    /// Retry with exponential backoff until the attempt bound, then drop
    Backoff,
    /// Do not requeue; a new reconcile request arrives when the object changes
    Never,
}

impl fmt::Display for RequeuePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate => write!(f, "immediate"),
            Self::Backoff => write!(f, "backoff"),
            Self::Never => write!(f, "never"),
        }
    }
}

/// Errors returned by reconcilers to the controller runtime
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("failed to read {kind} {key}: {source}")]
    Read {
        kind: &'static str,
        key: ObjectKey,
        #[source]
        source: ClusterError,
    },

    #[error("failed to persist finalizer change on {kind} {key}: {source}")]
    Persist {
        kind: &'static str,
        key: ObjectKey,
        #[source]
        source: ClusterError,
    },

    #[error("invalid spec on {kind} {key}: {reason}")]
    InvalidSpec {
        kind: &'static str,
        key: ObjectKey,
        reason: String,
    },

    #[error("lifecycle protocol violation on {kind} {key}: {source}")]
    Protocol {
        kind: &'static str,
        key: ObjectKey,
        #[source]
        source: StateMachineError,
    },

    #[error("{failed} delivery attempt(s) for event {key} failed with retryable errors, last: {last_error}")]
    RetryableDelivery {
        key: ObjectKey,
        failed: usize,
        last_error: String,
    },
}

impl ReconcileError {
    /// Classify this error into the requeue behaviour the runtime applies
    pub fn requeue_policy(&self) -> RequeuePolicy {
        match self {
            Self::Read { .. } | Self::Persist { .. } => RequeuePolicy::Immediate,
            Self::RetryableDelivery { .. } => RequeuePolicy::Backoff,
            Self::InvalidSpec { .. } | Self::Protocol { .. } => RequeuePolicy::Never,
        }
    }
}

pub type ReconcileResult<T> = std::result::Result<T, ReconcileError>;
