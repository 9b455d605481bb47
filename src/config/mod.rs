//! # Controller Configuration
//!
//! Layered configuration for the notification controller: compiled-in
//! defaults, then an optional TOML file (plus a per-environment overlay),
//! then `NOTIFY_*` environment variables.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use notify_core::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let workers = manager.config().controller.worker_count;
//! let attempts = manager.config().retry.max_attempts;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::constants::{defaults, DEFAULT_FINALIZER};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub controller: ControllerConfig,
    pub retry: RetryConfig,
    pub delivery: DeliveryConfig,
    pub rendering: RenderingConfig,
    pub logging: LoggingConfig,
}

impl NotifyConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.controller.worker_count == 0 {
            return Err(ConfigurationError::invalid_value(
                "controller.worker_count",
                self.controller.worker_count,
                "at least one worker is required",
            ));
        }
        if self.controller.finalizer.trim().is_empty() {
            return Err(ConfigurationError::invalid_value(
                "controller.finalizer",
                "\"\"",
                "finalizer name must not be empty",
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigurationError::invalid_value(
                "retry.max_attempts",
                self.retry.max_attempts,
                "at least one delivery attempt is required",
            ));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(ConfigurationError::invalid_value(
                "retry.base_delay_ms",
                self.retry.base_delay_ms,
                format!("must not exceed retry.max_delay_ms ({})", self.retry.max_delay_ms),
            ));
        }
        if self.retry.multiplier.is_nan() || self.retry.multiplier < 1.0 {
            return Err(ConfigurationError::invalid_value(
                "retry.multiplier",
                self.retry.multiplier,
                "must be >= 1.0",
            ));
        }
        if self.delivery.timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "delivery.timeout_ms",
                self.delivery.timeout_ms,
                "a delivery timeout is required",
            ));
        }
        self.rendering.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Reconcile workers; distinct keys run in parallel up to this bound
    pub worker_count: usize,
    pub finalizer: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            worker_count: defaults::WORKER_COUNT,
            finalizer: DEFAULT_FINALIZER.to_string(),
        }
    }
}

/// Requeue policy for events whose delivery failed with a retryable error
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total delivery attempts per event before it is dropped
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::MAX_DELIVERY_ATTEMPTS,
            base_delay_ms: defaults::BACKOFF_BASE.as_millis() as u64,
            max_delay_ms: defaults::BACKOFF_MAX.as_millis() as u64,
            multiplier: defaults::BACKOFF_MULTIPLIER,
        }
    }
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DeliveryConfig {
    pub timeout_ms: u64,
    pub user_agent: String,
    /// Skip TLS certificate verification for webhook endpoints
    pub accept_invalid_certs: bool,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            timeout_ms: defaults::DELIVERY_TIMEOUT.as_millis() as u64,
            user_agent: format!("k8s-notify/{}", env!("CARGO_PKG_VERSION")),
            accept_invalid_certs: false,
        }
    }
}

impl DeliveryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Deep-link templates embedded in rich notifications.
/// `{uid}` and `{name}` are replaced with the URL-encoded involved-object fields.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderingConfig {
    pub uid_link_template: String,
    pub name_link_template: String,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            uid_link_template:
                "https://logs.example.com/app/discover#/?_a=(query:(language:kuery,query:%22{uid}%22))"
                    .to_string(),
            name_link_template:
                "https://logs.example.com/app/discover#/?_a=(query:(language:kuery,query:%22{name}%22))"
                    .to_string(),
        }
    }
}

impl RenderingConfig {
    fn validate(&self) -> ConfigResult<()> {
        for (field, template, placeholder) in [
            ("rendering.uid_link_template", &self.uid_link_template, "{uid}"),
            ("rendering.name_link_template", &self.name_link_template, "{name}"),
        ] {
            if !template.contains(placeholder) {
                return Err(ConfigurationError::invalid_value(
                    field,
                    template,
                    format!("template must contain {placeholder}"),
                ));
            }
            let probe = template.replace(placeholder, "probe");
            url::Url::parse(&probe).map_err(|e| {
                ConfigurationError::invalid_value(field, template, format!("not a valid URL: {e}"))
            })?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
