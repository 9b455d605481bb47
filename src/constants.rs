//! # System Constants
//!
//! Names and default timings that define the operational boundaries of the
//! notification controller.

use std::time::Duration;

/// Finalizer placed on Notifier and EventSubscription objects so their deletion
/// is observed before the platform collects them
pub const DEFAULT_FINALIZER: &str = "finalizers.notify.k8s-notify.io";

/// Resource kind names as they appear in logs and errors
pub mod kinds {
    pub const NOTIFIER: &str = "Notifier";
    pub const EVENT_SUBSCRIPTION: &str = "EventSubscription";
    pub const EVENT: &str = "Event";
}

/// Glyphs prefixed to rich notifications, derived from the event type
pub mod glyphs {
    pub const NORMAL: &str = ":white_check_mark:";
    pub const WARNING: &str = ":warning:";
}

/// Content types posted to webhook endpoints
pub mod content_types {
    pub const JSON: &str = "application/json";
    pub const JSON_UTF8: &str = "application/json; charset=UTF-8";
}

/// Default values shared by configuration and runtime components
pub mod defaults {
    use super::Duration;

    pub const WORKER_COUNT: usize = 4;
    pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(2);
    pub const MAX_DELIVERY_ATTEMPTS: u32 = 5;
    pub const BACKOFF_BASE: Duration = Duration::from_millis(500);
    pub const BACKOFF_MAX: Duration = Duration::from_secs(30);
    pub const BACKOFF_MULTIPLIER: f64 = 2.0;
    pub const EVENT_CHANNEL_CAPACITY: usize = 1000;
}
