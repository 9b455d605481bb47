use super::object_meta::{ObjectKey, ObjectMeta};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A cluster event. Owned by the cluster and never mutated by the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterEvent {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub event_type: EventType,
    pub involved_object: InvolvedObject,
    #[serde(default)]
    pub source: EventSource,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub first_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_timestamp: Option<DateTime<Utc>>,
}

impl ClusterEvent {
    pub fn key(&self) -> ObjectKey {
        self.metadata.key()
    }

    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }
}

/// Event type as reported by the cluster. Strings other than `Normal` and
/// `Warning` are kept verbatim so they match and serialize exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventType {
    #[default]
    Normal,
    Warning,
    Other(String),
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Normal => "Normal",
            Self::Warning => "Warning",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for EventType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Normal" => Self::Normal,
            "Warning" => Self::Warning,
            _ => Self::Other(raw),
        }
    }
}

impl From<EventType> for String {
    fn from(event_type: EventType) -> Self {
        match event_type {
            EventType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvolvedObject {
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub uid: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSource {
    #[serde(default)]
    pub component: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}
