//! # Notifier Backends
//!
//! Closed set of delivery backends. Each `Notifier` stores a variant tag; the
//! matching `NotifierBackend` renders the payload for that variant and posts
//! it through a `WebhookTransport`.
//!
//! Delivery failures are classified once, here, into the two kinds the event
//! reconciler acts on:
//!
//! - **Retryable**: transport failures, timeouts, 408, 429 and 5xx responses
//! - **Permanent**: everything else that is not 2xx, plus webhook URLs that
//!   cannot be parsed or do not use an HTTP scheme

pub mod transport;

use crate::models::{BackendConfig, BackendVariant, ClusterEvent};
use crate::rendering::{NotificationRenderer, RenderedPayload};
use thiserror::Error;
use url::Url;

pub use transport::{ReqwestTransport, TransportError, WebhookTransport};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("retryable delivery failure: {0}")]
    Retryable(String),

    #[error("permanent delivery failure: {0}")]
    Permanent(String),
}

impl DeliveryError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable(_))
    }
}

impl From<TransportError> for DeliveryError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Build(reason) => Self::Permanent(reason),
            other => Self::Retryable(other.to_string()),
        }
    }
}

/// Map an HTTP status code onto the delivery outcome
pub fn classify_status(status: u16) -> Result<(), DeliveryError> {
    match status {
        200..=299 => Ok(()),
        408 | 429 | 500..=599 => Err(DeliveryError::Retryable(format!(
            "webhook responded with status {status}"
        ))),
        _ => Err(DeliveryError::Permanent(format!(
            "webhook responded with status {status}"
        ))),
    }
}

/// A delivery backend selected by the notifier's variant tag
///
/// The closed variant set lives on `BackendConfig`; this wrapper adds the
/// render and deliver capabilities on top of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifierBackend {
    config: BackendConfig,
}

impl From<BackendConfig> for NotifierBackend {
    fn from(config: BackendConfig) -> Self {
        Self { config }
    }
}

impl NotifierBackend {
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub fn variant(&self) -> BackendVariant {
        self.config.variant()
    }

    /// Render the payload for this variant's render mode
    pub fn render(&self, renderer: &NotificationRenderer, event: &ClusterEvent) -> RenderedPayload {
        renderer.render(&self.config, event)
    }

    /// Perform a single delivery attempt
    pub async fn deliver<T>(&self, transport: &T, payload: &RenderedPayload) -> Result<(), DeliveryError>
    where
        T: WebhookTransport + ?Sized,
    {
        let url = parse_webhook_url(self.config.webhook_url())?;
        let status = transport.post(url, payload).await?;
        classify_status(status)
    }
}

fn parse_webhook_url(raw: &str) -> Result<Url, DeliveryError> {
    let url = Url::parse(raw)
        .map_err(|e| DeliveryError::Permanent(format!("invalid webhook url {raw:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(DeliveryError::Permanent(format!(
            "unsupported webhook url scheme {scheme:?}"
        ))),
    }
}
