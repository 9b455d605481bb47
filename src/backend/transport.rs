//! HTTP transport seam for webhook delivery.
//!
//! Backends hand a fully rendered payload to a `WebhookTransport`, which
//! performs exactly one POST and reports the response status. Retry policy
//! lives in the event reconciler, never here.

use crate::config::DeliveryConfig;
use crate::rendering::RenderedPayload;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("could not build request: {0}")]
    Build(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport failure: {0}")]
    Network(String),
}

#[async_trait]
pub trait WebhookTransport: Send + Sync + fmt::Debug {
    /// POST the payload and return the HTTP status code
    async fn post(&self, url: Url, payload: &RenderedPayload) -> Result<u16, TransportError>;
}

/// `reqwest`-backed transport with a fixed per-request timeout
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(config: &DeliveryConfig) -> Result<Self, TransportError> {
        let timeout = config.timeout();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(config.user_agent.clone())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| TransportError::Build(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl WebhookTransport for ReqwestTransport {
    async fn post(&self, url: Url, payload: &RenderedPayload) -> Result<u16, TransportError> {
        let request = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, payload.content_type)
            .body(payload.body.clone());

        let exchange = async {
            let response = request.send().await?;
            let status = response.status().as_u16();
            // Drain the body so the connection goes back to the pool
            let _ = response.bytes().await;
            Ok::<_, reqwest::Error>(status)
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(Ok(status)) => {
                debug!(url = %url, status, "webhook responded");
                Ok(status)
            }
            Ok(Err(e)) => Err(classify_reqwest_error(&e, self.timeout)),
            Err(_) => Err(TransportError::Timeout(self.timeout)),
        }
    }
}

fn classify_reqwest_error(error: &reqwest::Error, timeout: Duration) -> TransportError {
    if error.is_builder() {
        TransportError::Build(error.to_string())
    } else if error.is_timeout() {
        TransportError::Timeout(timeout)
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Network(error.to_string())
    }
}
