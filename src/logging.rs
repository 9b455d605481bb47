//! # Structured Logging Module
//!
//! Structured logging for reconcile and delivery operations. Failures in this
//! system are only observable through logs, so every record carries the object
//! identity it concerns.

use crate::config::LoggingConfig;
use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging from configuration
///
/// `RUST_LOG` takes precedence over the configured level. Safe to call more
/// than once and when another subscriber is already installed.
pub fn init_structured_logging(config: &LoggingConfig) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = build_filter(&config.level);

        let console: Box<dyn Layer<Registry> + Send + Sync> = if config.json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(true)
                .with_filter(filter)
                .boxed()
        };

        if tracing_subscriber::registry().with(console).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            level = %config.level,
            json = config.json,
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Log a lifecycle (finalizer/registration) operation on a declarative resource
pub fn log_lifecycle_operation(
    operation: &str,
    kind: &str,
    namespace: &str,
    name: &str,
    state: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        kind = %kind,
        namespace = %namespace,
        name = %name,
        state = %state,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "📚 LIFECYCLE_OPERATION"
    );
}

/// Log a single delivery attempt for an (event, subscription) pair
pub fn log_delivery_attempt(
    event: &str,
    subscription: &str,
    notifier: &str,
    backend: &str,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        event = %event,
        subscription = %subscription,
        notifier = %notifier,
        backend = %backend,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "📨 DELIVERY_ATTEMPT"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "❌ ERROR"
    );
}
