//! Shared configuration and logging setup for the SMS proxy.

mod config;
mod error;
mod logging;

pub use config::{
    Config, DispatcherSection, ProviderSection, ReconcilerSection, StoreSection,
    ValidationSection, DEFAULT_LOG_LEVEL, DEFAULT_PROVIDER_URL,
};
pub use error::{ConfigError, ConfigResult};
pub use logging::init_logging;
