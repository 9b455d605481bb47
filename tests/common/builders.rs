//! Builders for test resources and a fast-retry configuration.

use notify_core::config::NotifyConfig;
use notify_core::models::{
    BackendConfig, ClusterEvent, EventSource, EventSubscription, EventType, FieldMatcher,
    InvolvedObject, Notifier, ObjectMeta, RichWebhookChatConfig, SubscriptionPredicate,
    WebhookChatConfig,
};
use std::sync::atomic::{AtomicUsize, Ordering};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

pub fn unique_name(prefix: &str) -> String {
    format!("{prefix}-{}", COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Defaults with millisecond backoff so retry tests finish quickly
pub fn fast_config() -> NotifyConfig {
    let mut config = NotifyConfig::default();
    config.controller.worker_count = 2;
    config.retry.max_attempts = 3;
    config.retry.base_delay_ms = 1;
    config.retry.max_delay_ms = 5;
    config
}

pub fn chat_notifier(namespace: &str, name: &str, url: &str) -> Notifier {
    Notifier::new(
        namespace,
        name,
        BackendConfig::WebhookChat(WebhookChatConfig {
            webhook_url: url.to_string(),
        }),
    )
}

pub fn rich_notifier(namespace: &str, name: &str, url: &str) -> Notifier {
    Notifier::new(
        namespace,
        name,
        BackendConfig::RichWebhookChat(RichWebhookChatConfig {
            webhook_url: url.to_string(),
            channel: Some("#ops".to_string()),
            username: Some("k8s-notify".to_string()),
            icon_emoji: None,
        }),
    )
}

pub struct SubscriptionBuilder {
    namespace: String,
    name: String,
    notifier: String,
    predicate: SubscriptionPredicate,
}

impl SubscriptionBuilder {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            notifier: "default".to_string(),
            predicate: SubscriptionPredicate::default(),
        }
    }

    pub fn notifier(mut self, notifier: &str) -> Self {
        self.notifier = notifier.to_string();
        self
    }

    pub fn event_type(mut self, event_type: EventType) -> Self {
        self.predicate = self.predicate.with_event_type(event_type);
        self
    }

    pub fn reason(mut self, reason: FieldMatcher) -> Self {
        self.predicate = self.predicate.with_reason(reason);
        self
    }

    pub fn involved_kind(mut self, kind: FieldMatcher) -> Self {
        self.predicate = self.predicate.with_involved_kind(kind);
        self
    }

    pub fn namespace_matcher(mut self, namespace: FieldMatcher) -> Self {
        self.predicate = self.predicate.with_namespace(namespace);
        self
    }

    pub fn build(self) -> EventSubscription {
        EventSubscription::new(self.namespace, self.name, self.notifier, self.predicate)
    }
}

pub struct EventBuilder {
    event: ClusterEvent,
}

impl EventBuilder {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            event: ClusterEvent {
                metadata: ObjectMeta::new(namespace, name),
                message: "Back-off restarting failed container".to_string(),
                event_type: EventType::Normal,
                involved_object: InvolvedObject {
                    kind: "Pod".to_string(),
                    name: "web-1".to_string(),
                    uid: "0d6e4c3a-5f0c-11ea".to_string(),
                },
                source: EventSource {
                    component: "kubelet".to_string(),
                    host: Some("node-1".to_string()),
                },
                reason: "BackOff".to_string(),
                first_timestamp: None,
                last_timestamp: None,
            },
        }
    }

    pub fn warning(mut self) -> Self {
        self.event.event_type = EventType::Warning;
        self
    }

    pub fn message(mut self, message: &str) -> Self {
        self.event.message = message.to_string();
        self
    }

    pub fn reason(mut self, reason: &str) -> Self {
        self.event.reason = reason.to_string();
        self
    }

    pub fn involved_kind(mut self, kind: &str) -> Self {
        self.event.involved_object.kind = kind.to_string();
        self
    }

    pub fn build(self) -> ClusterEvent {
        self.event
    }
}
