use crate::cluster::ReconcileRequest;
use crate::constants::defaults;
use crate::error::RequeuePolicy;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::broadcast;

/// What happened to a reconcile request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    Reconciled,
    Requeued {
        policy: RequeuePolicy,
        attempt: u32,
        #[serde(with = "duration_millis")]
        delay: Duration,
        error: String,
    },
    Dropped {
        attempts: u32,
        error: String,
    },
}

/// Event that has been published
#[derive(Debug, Clone, Serialize)]
pub struct ControllerEvent {
    pub request: ReconcileRequest,
    #[serde(flatten)]
    pub outcome: ReconcileOutcome,
    pub published_at: DateTime<Utc>,
}

/// Broadcast publisher for reconcile outcomes
#[derive(Debug, Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<ControllerEvent>,
}

impl EventPublisher {
    /// Create a new event publisher with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, request: ReconcileRequest, outcome: ReconcileOutcome) {
        let event = ControllerEvent {
            request,
            outcome,
            published_at: Utc::now(),
        };

        // send() only fails when nobody is listening
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(defaults::EVENT_CHANNEL_CAPACITY)
    }
}

mod duration_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }
}
