//! # Notification Rendering
//!
//! Pure construction of webhook payloads from cluster events. Rendering never
//! performs I/O and never fails: payloads are built as `serde_json::Value`
//! trees, so JSON string escaping of every interpolated field (quotes,
//! backslashes, control characters) is structural rather than textual.

pub mod renderer;

pub use renderer::{escape_mrkdwn, NotificationRenderer, RenderedPayload};
