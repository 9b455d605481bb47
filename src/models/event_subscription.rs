use super::cluster_event::EventType;
use super::object_meta::{ObjectKey, ObjectMeta};
use serde::{Deserialize, Serialize};

/// Declarative routing rule from a predicate over cluster events to a Notifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSubscription {
    pub metadata: ObjectMeta,
    pub spec: EventSubscriptionSpec,
}

impl EventSubscription {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        notifier: impl Into<String>,
        predicate: SubscriptionPredicate,
    ) -> Self {
        Self {
            metadata: ObjectMeta::new(namespace, name),
            spec: EventSubscriptionSpec {
                notifier: notifier.into(),
                predicate,
            },
        }
    }

    pub fn key(&self) -> ObjectKey {
        self.metadata.key()
    }

    /// The referenced Notifier lives in the subscription's own namespace
    pub fn notifier_key(&self) -> ObjectKey {
        ObjectKey::new(self.metadata.namespace.clone(), self.spec.notifier.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSubscriptionSpec {
    /// Name of the Notifier this subscription routes to
    pub notifier: String,
    #[serde(default)]
    pub predicate: SubscriptionPredicate,
}

/// Conjunction of optional field matchers. Every absent field matches anything,
/// except `namespace`, which defaults to the subscription's own namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPredicate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<FieldMatcher>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub involved_kind: Option<FieldMatcher>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<FieldMatcher>,
}

impl SubscriptionPredicate {
    pub fn with_event_type(mut self, event_type: EventType) -> Self {
        self.event_type = Some(event_type);
        self
    }

    pub fn with_reason(mut self, reason: FieldMatcher) -> Self {
        self.reason = Some(reason);
        self
    }

    pub fn with_involved_kind(mut self, kind: FieldMatcher) -> Self {
        self.involved_kind = Some(kind);
        self
    }

    pub fn with_namespace(mut self, namespace: FieldMatcher) -> Self {
        self.namespace = Some(namespace);
        self
    }
}

/// Either a literal value or a regular expression that must match the whole field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldMatcher {
    Exact(String),
    Pattern { pattern: String },
}

impl FieldMatcher {
    pub fn exact(value: impl Into<String>) -> Self {
        Self::Exact(value.into())
    }

    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicate_deserializes_exact_and_pattern_matchers() {
        let json = serde_json::json!({
            "notifier": "slack-ops",
            "predicate": {
                "event_type": "Warning",
                "reason": "BackOff",
                "involved_kind": {"pattern": "Pod|Deployment"}
            }
        });
        let spec: EventSubscriptionSpec = serde_json::from_value(json).unwrap();

        assert_eq!(spec.notifier, "slack-ops");
        assert_eq!(spec.predicate.event_type, Some(EventType::Warning));
        assert_eq!(spec.predicate.reason, Some(FieldMatcher::exact("BackOff")));
        assert_eq!(
            spec.predicate.involved_kind,
            Some(FieldMatcher::pattern("Pod|Deployment"))
        );
        assert!(spec.predicate.namespace.is_none());
    }

    #[test]
    fn missing_predicate_defaults_to_empty() {
        let spec: EventSubscriptionSpec =
            serde_json::from_value(serde_json::json!({"notifier": "n"})).unwrap();
        assert_eq!(spec.predicate, SubscriptionPredicate::default());
    }

    #[test]
    fn notifier_reference_resolves_in_own_namespace() {
        let sub = EventSubscription::new("team-a", "warnings", "slack-ops", SubscriptionPredicate::default());
        assert_eq!(sub.notifier_key(), ObjectKey::new("team-a", "slack-ops"));
    }
}
