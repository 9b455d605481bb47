//! # Resource Models
//!
//! The three resource kinds the controller observes: the two declarative,
//! finalizer-bearing resources (`Notifier`, `EventSubscription`) and the
//! read-only cluster `Event`.

pub mod cluster_event;
pub mod event_subscription;
pub mod notifier;
pub mod object_meta;
pub mod resource;

pub use cluster_event::{ClusterEvent, EventSource, EventType, InvolvedObject};
pub use event_subscription::{EventSubscription, EventSubscriptionSpec, FieldMatcher, SubscriptionPredicate};
pub use notifier::{BackendConfig, BackendVariant, Notifier, NotifierSpec, RichWebhookChatConfig, WebhookChatConfig};
pub use object_meta::{ObjectKey, ObjectMeta};
pub use resource::Resource;
