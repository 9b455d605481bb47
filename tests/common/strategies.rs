//! proptest strategies over events and subscription predicates.

use notify_core::models::{
    ClusterEvent, EventSubscription, EventType, FieldMatcher, SubscriptionPredicate,
};
use proptest::prelude::*;
use regex::Regex;

use super::builders::EventBuilder;

pub const NAMESPACES: &[&str] = &["default", "payments", "kube-system"];
pub const REASONS: &[&str] = &["BackOff", "Pulled", "FailedMount", "Killing"];
pub const KINDS: &[&str] = &["Pod", "Node", "Deployment"];
pub const PATTERNS: &[&str] = &["Back.*", "Pull(ed|ing)", "Fail.*|Kill.*", "P.d", "kube-.*", ".*"];

pub fn event_type_strategy() -> impl Strategy<Value = EventType> {
    prop_oneof![
        Just(EventType::Normal),
        Just(EventType::Warning),
        Just(EventType::Other("Critical".to_string())),
        Just(EventType::Other("Error".to_string())),
    ]
}

fn pick(values: &'static [&'static str]) -> impl Strategy<Value = String> {
    prop::sample::select(values).prop_map(str::to_string)
}

pub fn matcher_strategy(values: &'static [&'static str]) -> impl Strategy<Value = FieldMatcher> {
    prop_oneof![
        pick(values).prop_map(FieldMatcher::Exact),
        pick(PATTERNS).prop_map(FieldMatcher::pattern),
    ]
}

pub fn predicate_strategy() -> impl Strategy<Value = SubscriptionPredicate> {
    (
        prop::option::of(event_type_strategy()),
        prop::option::of(matcher_strategy(REASONS)),
        prop::option::of(matcher_strategy(KINDS)),
        prop::option::of(matcher_strategy(NAMESPACES)),
    )
        .prop_map(|(event_type, reason, involved_kind, namespace)| SubscriptionPredicate {
            event_type,
            reason,
            involved_kind,
            namespace,
        })
}

/// Subscriptions with distinct names spread over the fixed namespaces
pub fn subscriptions_strategy() -> impl Strategy<Value = Vec<EventSubscription>> {
    prop::collection::vec((pick(NAMESPACES), predicate_strategy()), 0..12).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (namespace, predicate))| {
                EventSubscription::new(namespace, format!("sub-{i}"), "notifier", predicate)
            })
            .collect()
    })
}

pub fn event_strategy() -> impl Strategy<Value = ClusterEvent> {
    (pick(NAMESPACES), event_type_strategy(), pick(REASONS), pick(KINDS)).prop_map(
        |(namespace, event_type, reason, kind)| {
            let mut event = EventBuilder::new(&namespace, "evt")
                .reason(&reason)
                .involved_kind(&kind)
                .build();
            event.event_type = event_type;
            event
        },
    )
}

/// Free text biased toward characters that need escaping
pub fn message_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<String>(),
        "[a-z \"\\\\\n\t<>&|*_`{}]{0,80}",
    ]
}

/// Reference evaluation of a predicate, written independently of the index
pub fn oracle_matches(subscription: &EventSubscription, event: &ClusterEvent) -> bool {
    fn field(matcher: &Option<FieldMatcher>, value: &str) -> bool {
        match matcher {
            None => true,
            Some(FieldMatcher::Exact(expected)) => expected == value,
            Some(FieldMatcher::Pattern { pattern }) => Regex::new(&format!("^(?:{pattern})$"))
                .map(|re| re.is_match(value))
                .unwrap_or(false),
        }
    }

    let predicate = &subscription.spec.predicate;
    let namespace_ok = match &predicate.namespace {
        None => subscription.metadata.namespace == event.metadata.namespace,
        some => field(some, &event.metadata.namespace),
    };

    namespace_ok
        && predicate.event_type.as_ref().map_or(true, |t| *t == event.event_type)
        && field(&predicate.reason, &event.reason)
        && field(&predicate.involved_kind, &event.involved_object.kind)
}
