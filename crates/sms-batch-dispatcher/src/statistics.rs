//! Flush outcome reporting.

use crate::OutboundMessage;
use chrono::{DateTime, Utc};
use sms_status_store::{MessageId, StoreError};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};

/// A terminal status that could not be applied after a flush.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizationError {
    pub message_id: MessageId,
    pub error: StoreError,
}

/// Outcome of one flush. Exactly one report is recorded per flush.
#[derive(Debug, Clone)]
pub struct FlushReport {
    /// Messages that were attempted.
    pub batch: Vec<OutboundMessage>,
    /// Provider error of the last attempt, `None` on success.
    pub error: Option<String>,
    /// Attempt the flush ended on (1-based).
    pub attempt: u32,
    /// Effective attempt limit for this flush.
    pub max_attempts: u32,
    /// Status updates rejected by the store while finalizing.
    pub finalization_errors: Vec<FinalizationError>,
    pub completed_at: DateTime<Utc>,
}

impl FlushReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Receiver of flush outcomes. Must return quickly.
pub trait StatisticsSink: Send + Sync {
    fn record(&self, report: FlushReport);
}

/// Statistics sink that logs every report and keeps running counters.
#[derive(Debug, Default)]
pub struct TracingStatisticsSink {
    successes: AtomicU64,
    failures: AtomicU64,
    finalization_failures: AtomicU64,
}

impl TracingStatisticsSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of flushes that were delivered.
    pub fn successes(&self) -> u64 {
        self.successes.load(Ordering::Relaxed)
    }

    /// Number of flushes that exhausted their attempts.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Number of per-message status updates rejected by the store.
    pub fn finalization_failures(&self) -> u64 {
        self.finalization_failures.load(Ordering::Relaxed)
    }
}

impl StatisticsSink for TracingStatisticsSink {
    fn record(&self, report: FlushReport) {
        self.finalization_failures
            .fetch_add(report.finalization_errors.len() as u64, Ordering::Relaxed);

        match &report.error {
            None => {
                self.successes.fetch_add(1, Ordering::Relaxed);
                info!(
                    messages = report.batch.len(),
                    attempt = report.attempt,
                    max_attempts = report.max_attempts,
                    finalization_errors = report.finalization_errors.len(),
                    "Batch delivered"
                );
            }
            Some(error) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!(
                    messages = report.batch.len(),
                    attempt = report.attempt,
                    max_attempts = report.max_attempts,
                    finalization_errors = report.finalization_errors.len(),
                    error = %error,
                    "Batch failed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(error: Option<&str>, finalization_errors: Vec<FinalizationError>) -> FlushReport {
        FlushReport {
            batch: vec![OutboundMessage::new(MessageId::new(), "+48123456789", "hi")],
            error: error.map(str::to_string),
            attempt: 1,
            max_attempts: 1,
            finalization_errors,
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_tracing_sink_counts_outcomes() {
        let sink = TracingStatisticsSink::new();
        let id = MessageId::new();

        sink.record(report(None, vec![]));
        sink.record(report(Some("boom"), vec![]));
        sink.record(report(
            None,
            vec![FinalizationError {
                message_id: id,
                error: StoreError::NotFound(id),
            }],
        ));

        assert_eq!(sink.successes(), 2);
        assert_eq!(sink.failures(), 1);
        assert_eq!(sink.finalization_failures(), 1);
    }

    #[test]
    fn test_report_success_flag() {
        assert!(report(None, vec![]).is_success());
        assert!(!report(Some("boom"), vec![]).is_success());
    }
}
