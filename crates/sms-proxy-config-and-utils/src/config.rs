//! Configuration management for the SMS proxy.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use sms_status_store::TransitionPolicy;
use std::path::Path;
use url::Url;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default provider base URL.
pub const DEFAULT_PROVIDER_URL: &str = "http://127.0.0.1:8090";

/// Main proxy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    pub dispatcher: DispatcherSection,
    pub reconciler: ReconcilerSection,
    pub store: StoreSection,
    pub provider: ProviderSection,
    pub validation: ValidationSection,
}

/// Batching and retry settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherSection {
    pub min_batch_size: usize,
    /// Values below 1 mean a single attempt.
    pub max_attempts: i32,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
    pub send_timeout_ms: u64,
    pub queue_capacity: usize,
    /// Flush lingering partial batches this often.
    pub flush_interval_ms: Option<u64>,
}

impl Default for DispatcherSection {
    fn default() -> Self {
        Self {
            min_batch_size: 10,
            max_attempts: 3,
            retry_base_delay_ms: 0,
            retry_max_delay_ms: 5_000,
            send_timeout_ms: 30_000,
            queue_capacity: 64,
            flush_interval_ms: None,
        }
    }
}

/// Status reconciler channel sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcilerSection {
    pub input_capacity: usize,
    pub error_capacity: usize,
}

impl Default for ReconcilerSection {
    fn default() -> Self {
        Self {
            input_capacity: 1024,
            error_capacity: 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub transition_policy: TransitionPolicy,
}

/// Bulk-send provider endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSection {
    pub base_url: String,
    pub api_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ProviderSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PROVIDER_URL.to_string(),
            api_token: None,
            timeout_secs: 30,
        }
    }
}

/// Limits applied to incoming send requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSection {
    pub max_content_length: usize,
}

impl Default for ValidationSection {
    fn default() -> Self {
        Self {
            max_content_length: 160,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            dispatcher: DispatcherSection::default(),
            reconciler: ReconcilerSection::default(),
            store: StoreSection::default(),
            provider: ProviderSection::default(),
            validation: ValidationSection::default(),
        }
    }
}

impl Config {
    /// Load from `path` if it exists (defaults otherwise), apply environment
    /// overrides and validate.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) if path.exists() => Self::load_from_file(path)?,
            _ => Self::default(),
        };

        config.load_from_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific JSON file.
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration as pretty JSON.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Override configuration from `SMS_PROXY_*` environment variables.
    fn load_from_env(&mut self) {
        self.apply_env(|name| std::env::var(name).ok());
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(level) = lookup("SMS_PROXY_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(size) = lookup("SMS_PROXY_MIN_BATCH_SIZE").and_then(|s| s.parse().ok()) {
            self.dispatcher.min_batch_size = size;
        }
        if let Some(attempts) = lookup("SMS_PROXY_MAX_ATTEMPTS").and_then(|s| s.parse().ok()) {
            self.dispatcher.max_attempts = attempts;
        }
        if let Some(url) = lookup("SMS_PROXY_PROVIDER_URL") {
            self.provider.base_url = url;
        }
    }

    /// Reject values the runtime cannot work with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.dispatcher.min_batch_size == 0 {
            return Err(ConfigError::Invalid(
                "dispatcher.min_batch_size must be at least 1".to_string(),
            ));
        }
        if self.dispatcher.queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "dispatcher.queue_capacity must be at least 1".to_string(),
            ));
        }
        if self.dispatcher.flush_interval_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "dispatcher.flush_interval_ms must be positive".to_string(),
            ));
        }
        if self.reconciler.input_capacity == 0 || self.reconciler.error_capacity == 0 {
            return Err(ConfigError::Invalid(
                "reconciler capacities must be at least 1".to_string(),
            ));
        }
        if self.validation.max_content_length == 0 {
            return Err(ConfigError::Invalid(
                "validation.max_content_length must be at least 1".to_string(),
            ));
        }
        self.provider_url()?;
        Ok(())
    }

    /// Get the provider URL as a parsed URL.
    pub fn provider_url(&self) -> ConfigResult<Url> {
        Url::parse(&self.provider.base_url).map_err(ConfigError::from)
    }
}
