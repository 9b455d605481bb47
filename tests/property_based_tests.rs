mod common;

use common::strategies::*;
use common::{EventBuilder, SubscriptionBuilder};
use notify_core::controller::BackoffPolicy;
use notify_core::models::{BackendConfig, RichWebhookChatConfig, WebhookChatConfig};
use notify_core::registry::{SubscriptionEntry, SubscriptionIndex};
use notify_core::rendering::NotificationRenderer;
use proptest::prelude::*;
use std::time::Duration;

fn index_from(subscriptions: &[notify_core::models::EventSubscription]) -> SubscriptionIndex {
    let mut index = SubscriptionIndex::new();
    for subscription in subscriptions {
        let entry = SubscriptionEntry::from_subscription(subscription).unwrap();
        index.upsert(subscription.key(), entry);
    }
    index
}

proptest! {
    /// Property: the index returns exactly the subscriptions whose predicate holds
    #[test]
    fn matching_equals_reference_evaluation(
        subscriptions in subscriptions_strategy(),
        event in event_strategy(),
    ) {
        let index = index_from(&subscriptions);

        let mut expected: Vec<_> = subscriptions
            .iter()
            .filter(|s| oracle_matches(s, &event))
            .map(|s| s.key())
            .collect();
        expected.sort();

        prop_assert_eq!(index.matches(&event), expected);
    }

    /// Property: insertion order does not change the match result
    #[test]
    fn matching_is_independent_of_insertion_order(
        subscriptions in subscriptions_strategy(),
        event in event_strategy(),
    ) {
        let forward = index_from(&subscriptions);
        let mut reversed_input = subscriptions.clone();
        reversed_input.reverse();
        let reversed = index_from(&reversed_input);

        prop_assert_eq!(forward.matches(&event), reversed.matches(&event));
    }

    /// Property: plain payloads stay valid JSON and carry the message verbatim
    #[test]
    fn plain_payload_survives_any_message(message in message_strategy()) {
        let renderer = NotificationRenderer::default();
        let event = EventBuilder::new("ns", "e1").message(&message).build();
        let backend = BackendConfig::WebhookChat(WebhookChatConfig {
            webhook_url: "https://chat.test/hook".to_string(),
        });

        let payload = renderer.render(&backend, &event);
        let parsed: serde_json::Value = serde_json::from_str(&payload.body).unwrap();
        prop_assert_eq!(parsed["text"].as_str(), Some(message.as_str()));
    }

    /// Property: rich payloads stay valid JSON and never leak raw markup delimiters
    #[test]
    fn rich_payload_escapes_markup(message in message_strategy(), name in message_strategy()) {
        let renderer = NotificationRenderer::default();
        let mut event = EventBuilder::new("ns", "e1").warning().message(&message).build();
        event.involved_object.name = name;
        let backend = BackendConfig::RichWebhookChat(RichWebhookChatConfig {
            webhook_url: "https://hooks.slack.test/x".to_string(),
            channel: None,
            username: None,
            icon_emoji: None,
        });

        let payload = renderer.render(&backend, &event);
        let parsed: serde_json::Value = serde_json::from_str(&payload.body).unwrap();

        let text = parsed["text"].as_str().unwrap();
        prop_assert!(!text.contains('<') && !text.contains('>'));
        let unescaped = text.replace("&lt;", "<").replace("&gt;", ">").replace("&amp;", "&");
        prop_assert_eq!(unescaped, message);

        // The name link is the only '<'..'>' pair in its element
        let name_element = parsed["blocks"][2]["elements"][1]["text"].as_str().unwrap();
        prop_assert!(name_element.starts_with('<') && name_element.ends_with('>'));
        prop_assert_eq!(name_element.matches('<').count(), 1);
        prop_assert_eq!(name_element.matches('>').count(), 1);
    }

    /// Property: backoff never decreases and never exceeds the cap
    #[test]
    fn backoff_is_monotonic_and_capped(attempt in 1u32..200) {
        let policy = BackoffPolicy::default();
        let current = policy.delay(attempt);
        prop_assert!(current <= policy.max);
        prop_assert!(policy.delay(attempt + 1) >= current);
        prop_assert!(current >= Duration::from_millis(500));
    }
}

#[test]
fn oracle_agrees_on_a_hand_written_case() {
    let subscription = SubscriptionBuilder::new("ns", "s")
        .reason(notify_core::models::FieldMatcher::pattern("Back.*"))
        .build();
    let event = EventBuilder::new("ns", "e").reason("BackOff").build();
    assert!(oracle_matches(&subscription, &event));
    assert!(!oracle_matches(
        &subscription,
        &EventBuilder::new("other", "e").reason("BackOff").build()
    ));
}
