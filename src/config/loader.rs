//! Configuration Loader
//!
//! Environment-aware layered loading built on the `config` crate:
//!
//! 1. compiled-in defaults (every section is `#[serde(default)]`)
//! 2. `<dir>/notify.toml`, when present
//! 3. `<dir>/notify.<environment>.toml`, when present
//! 4. `NOTIFY_<SECTION>__<KEY>` environment variables

use super::error::ConfigResult;
use super::NotifyConfig;
use config::{Config, Environment, File, FileFormat};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const ENV_PREFIX: &str = "NOTIFY";
const BASE_FILE: &str = "notify.toml";

/// Loaded, validated configuration together with where it came from
#[derive(Debug)]
pub struct ConfigManager {
    config: NotifyConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment, None)
    }

    /// Load configuration with an explicit environment name and, optionally, an
    /// explicit variable map used instead of the process environment
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
        variables: Option<HashMap<String, String>>,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);

        debug!(
            environment = %environment,
            directory = %config_directory.display(),
            "Loading configuration"
        );

        let config = Self::build(&config_directory, environment, variables)?;
        config.validate()?;

        info!(
            environment = %environment,
            worker_count = config.controller.worker_count,
            max_attempts = config.retry.max_attempts,
            delivery_timeout_ms = config.delivery.timeout_ms,
            "⚙️ Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    fn build(
        directory: &Path,
        environment: &str,
        variables: Option<HashMap<String, String>>,
    ) -> ConfigResult<NotifyConfig> {
        let base = directory.join(BASE_FILE);
        let overlay = directory.join(format!("notify.{environment}.toml"));

        let settings = Config::builder()
            .add_source(File::from(base.as_path()).format(FileFormat::Toml).required(false))
            .add_source(File::from(overlay.as_path()).format(FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(variables),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn config(&self) -> &NotifyConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// `NOTIFY_ENV`, then `APP_ENV`, defaulting to `development`
    pub fn detect_environment() -> String {
        env::var("NOTIFY_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
    }

    fn default_config_directory() -> PathBuf {
        env::var("NOTIFY_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"))
    }
}
