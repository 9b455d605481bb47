use super::object_meta::{ObjectKey, ObjectMeta};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declarative definition of a notification destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notifier {
    pub metadata: ObjectMeta,
    pub spec: NotifierSpec,
}

impl Notifier {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, backend: BackendConfig) -> Self {
        Self {
            metadata: ObjectMeta::new(namespace, name),
            spec: NotifierSpec { backend },
        }
    }

    pub fn key(&self) -> ObjectKey {
        self.metadata.key()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifierSpec {
    pub backend: BackendConfig,
}

/// Variant-specific backend configuration, selected by the `type` tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackendConfig {
    /// Hangouts-Chat style webhook taking a plain `{"text": ...}` body
    WebhookChat(WebhookChatConfig),
    /// Slack style webhook taking a block layout
    RichWebhookChat(RichWebhookChatConfig),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookChatConfig {
    pub webhook_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichWebhookChatConfig {
    pub webhook_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<String>,
}

/// Tag of a backend configuration, used for logging and render mode selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendVariant {
    WebhookChat,
    RichWebhookChat,
}

impl fmt::Display for BackendVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WebhookChat => write!(f, "webhook_chat"),
            Self::RichWebhookChat => write!(f, "rich_webhook_chat"),
        }
    }
}

impl BackendConfig {
    pub fn variant(&self) -> BackendVariant {
        match self {
            Self::WebhookChat(_) => BackendVariant::WebhookChat,
            Self::RichWebhookChat(_) => BackendVariant::RichWebhookChat,
        }
    }

    pub fn webhook_url(&self) -> &str {
        match self {
            Self::WebhookChat(config) => &config.webhook_url,
            Self::RichWebhookChat(config) => &config.webhook_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_config_is_tagged_by_type() {
        let json = serde_json::json!({
            "type": "rich_webhook_chat",
            "webhook_url": "https://hooks.slack.test/T000/B000",
            "channel": "#ops"
        });
        let config: BackendConfig = serde_json::from_value(json).unwrap();

        assert_eq!(config.variant(), BackendVariant::RichWebhookChat);
        assert_eq!(config.webhook_url(), "https://hooks.slack.test/T000/B000");
        match config {
            BackendConfig::RichWebhookChat(rich) => {
                assert_eq!(rich.channel.as_deref(), Some("#ops"));
                assert!(rich.username.is_none());
            }
            other => panic!("unexpected variant {other:?}"),
        }
    }

    #[test]
    fn unknown_backend_type_is_rejected() {
        let json = serde_json::json!({"type": "pager", "webhook_url": "https://x"});
        assert!(serde_json::from_value::<BackendConfig>(json).is_err());
    }
}
