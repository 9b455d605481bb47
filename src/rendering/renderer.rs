use crate::config::RenderingConfig;
use crate::constants::{content_types, glyphs};
use crate::models::{BackendConfig, ClusterEvent, EventType, RichWebhookChatConfig};
use serde_json::{json, Map, Value};
use url::form_urlencoded;

/// A serialized payload ready for the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPayload {
    pub body: String,
    pub content_type: &'static str,
}

impl RenderedPayload {
    fn json(value: &Value, content_type: &'static str) -> Self {
        Self {
            body: value.to_string(),
            content_type,
        }
    }
}

/// Builds transport payloads for each backend variant
#[derive(Debug, Clone, Default)]
pub struct NotificationRenderer {
    links: RenderingConfig,
}

impl NotificationRenderer {
    pub fn new(links: RenderingConfig) -> Self {
        Self { links }
    }

    /// Render the payload for the render mode implied by the backend variant
    pub fn render(&self, backend: &BackendConfig, event: &ClusterEvent) -> RenderedPayload {
        match backend {
            BackendConfig::WebhookChat(_) => {
                RenderedPayload::json(&self.render_plain(&event.message), content_types::JSON_UTF8)
            }
            BackendConfig::RichWebhookChat(config) => {
                RenderedPayload::json(&self.render_rich(event, config), content_types::JSON)
            }
        }
    }

    /// Plain mode: `{"text": <message>}`
    pub fn render_plain(&self, message: &str) -> Value {
        json!({ "text": message })
    }

    /// Rich mode: divider, status section and a context section of deep links
    pub fn render_rich(&self, event: &ClusterEvent, config: &RichWebhookChatConfig) -> Value {
        let message = escape_mrkdwn(&event.message);
        let object_name = escape_mrkdwn(&event.involved_object.name);
        let extra = escape_mrkdwn(&format!(
            "{} {} {}",
            event.involved_object.kind, event.source.component, event.reason
        ));

        let uid_link = expand_link(&self.links.uid_link_template, "{uid}", &event.involved_object.uid);
        let name_link = expand_link(
            &self.links.name_link_template,
            "{name}",
            &event.involved_object.name,
        );

        let mut payload = Map::new();
        for (field, value) in [
            ("channel", &config.channel),
            ("username", &config.username),
            ("icon_emoji", &config.icon_emoji),
        ] {
            if let Some(value) = value {
                payload.insert(field.to_string(), Value::String(value.clone()));
            }
        }
        payload.insert("text".to_string(), Value::String(message.clone()));
        payload.insert(
            "blocks".to_string(),
            json!([
                { "type": "divider" },
                {
                    "type": "section",
                    "text": {
                        "type": "mrkdwn",
                        "text": format!("{} {}", status_glyph(&event.event_type), message),
                    }
                },
                {
                    "type": "context",
                    "elements": [
                        { "type": "mrkdwn", "text": format!(":mag: <{uid_link}|uid>") },
                        { "type": "mrkdwn", "text": format!("<{name_link}|{object_name}>") },
                        { "type": "mrkdwn", "text": extra },
                    ]
                }
            ]),
        );

        Value::Object(payload)
    }
}

fn status_glyph(event_type: &EventType) -> &'static str {
    match event_type {
        EventType::Normal => glyphs::NORMAL,
        _ => glyphs::WARNING,
    }
}

fn expand_link(template: &str, placeholder: &str, value: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(value.as_bytes()).collect();
    template.replace(placeholder, &encoded)
}

/// Escape the characters chat markup treats as control sequences
pub fn escape_mrkdwn(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}
