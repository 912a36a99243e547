//! Logging initialization.
//!
//! All crates log through `tracing` macros; the embedding process calls
//! [`init_logging`] once at startup.

use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// - `RUST_LOG` overrides `level` when set
/// - `SMS_PROXY_LOG_FORMAT=json` switches to structured JSON lines
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let json = std::env::var("SMS_PROXY_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let result = if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .finish()
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .finish()
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("Global subscriber already set, keeping it");
    }
}
