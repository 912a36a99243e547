//! Dispatcher configuration.

use std::time::Duration;

/// Configuration for batching and retry behavior.
///
/// # Backoff Calculation
///
/// Retry delay follows `retry_base_delay * 2^(attempt - 1)` capped at
/// `retry_max_delay`. A zero base delay retries immediately.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Pending size that triggers a flush.
    pub min_batch_size: usize,
    /// Provider attempts per flush. Values below 1 mean a single attempt.
    pub max_attempts: i32,
    /// Base duration for exponential backoff between attempts.
    pub retry_base_delay: Duration,
    /// Maximum backoff between attempts.
    pub retry_max_delay: Duration,
    /// Deadline for a single provider call.
    pub send_timeout: Duration,
    /// Batches that may wait for the flush worker before producers block.
    pub queue_capacity: usize,
    /// Hand off non-empty partial batches this often. `None` flushes only at threshold.
    pub flush_interval: Option<Duration>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            min_batch_size: 10,
            max_attempts: 3,
            retry_base_delay: Duration::ZERO,
            retry_max_delay: Duration::from_secs(5),
            send_timeout: Duration::from_secs(30),
            queue_capacity: 64,
            flush_interval: None,
        }
    }
}
