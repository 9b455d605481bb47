//! Scripted in-process webhook endpoint for delivery tests.

use async_trait::async_trait;
use notify_core::backend::{TransportError, WebhookTransport};
use notify_core::rendering::RenderedPayload;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub url: String,
    pub payload: RenderedPayload,
}

impl RecordedCall {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.payload.body).expect("payload is not valid JSON")
    }
}

#[derive(Debug, Default)]
struct Script {
    /// One-shot responses consumed in order
    queued: HashMap<String, VecDeque<Result<u16, TransportError>>>,
    /// Response once the queue for a URL is empty
    fallback: HashMap<String, Result<u16, TransportError>>,
    calls: Vec<RecordedCall>,
}

/// Records every POST and answers 200 unless told otherwise
#[derive(Debug, Default)]
pub struct RecordingTransport {
    script: Mutex<Script>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every request to `url` with `response`
    pub fn always(&self, url: &str, response: Result<u16, TransportError>) {
        self.script.lock().fallback.insert(url.to_string(), response);
    }

    /// Answer the next requests to `url` with `responses`, in order
    pub fn then(&self, url: &str, responses: Vec<Result<u16, TransportError>>) {
        self.script
            .lock()
            .queued
            .entry(url.to_string())
            .or_default()
            .extend(responses);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.script.lock().calls.clone()
    }

    pub fn calls_to(&self, url: &str) -> Vec<RecordedCall> {
        self.calls().into_iter().filter(|c| c.url == url).collect()
    }

    pub fn call_count(&self) -> usize {
        self.script.lock().calls.len()
    }
}

#[async_trait]
impl WebhookTransport for RecordingTransport {
    async fn post(&self, url: Url, payload: &RenderedPayload) -> Result<u16, TransportError> {
        let mut script = self.script.lock();
        let url = url.to_string();
        script.calls.push(RecordedCall {
            url: url.clone(),
            payload: payload.clone(),
        });
        if let Some(response) = script.queued.get_mut(&url).and_then(VecDeque::pop_front) {
            return response;
        }
        script.fallback.get(&url).cloned().unwrap_or(Ok(200))
    }
}
