use crate::config::RetryConfig;
use std::time::Duration;

/// Exponential requeue delay: `min(base * multiplier^(attempt - 1), max)`
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub max: Duration,
    pub multiplier: f64,
    /// Attempts before a `Backoff`-classified failure is dropped
    pub max_attempts: u32,
}

impl BackoffPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            base: config.base_delay(),
            max: config.max_delay(),
            multiplier: config.multiplier,
            max_attempts: config.max_attempts,
        }
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.base.as_secs_f64() * self.multiplier.powi(exponent);
        if !secs.is_finite() || secs >= self.max.as_secs_f64() {
            return self.max;
        }
        Duration::from_secs_f64(secs)
    }

    /// Whether a failure on this attempt exhausts the bound
    pub fn is_exhausted(&self, attempt: u32) -> bool {
        attempt >= self.max_attempts
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
