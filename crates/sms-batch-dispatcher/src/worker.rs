//! Flush worker: retries a batch against the provider and finalizes statuses.

use crate::dispatcher::PendingState;
use crate::{
    DispatcherConfig, FinalizationError, FlushReport, OutboundMessage, ProviderClient,
    ProviderError, ProviderResult, StatisticsSink,
};
use chrono::Utc;
use sms_status_store::{MessageStatus, StatusStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Attempts per flush for a configured value; anything below 1 means 1.
pub fn effective_max_attempts(configured: i32) -> u32 {
    if configured < 1 {
        1
    } else {
        configured as u32
    }
}

/// Delay to wait after failed `attempt` before the next one.
pub fn backoff_delay(config: &DispatcherConfig, attempt: u32) -> Duration {
    let factor = 1u32
        .checked_shl(attempt.saturating_sub(1))
        .unwrap_or(u32::MAX);
    config
        .retry_base_delay
        .checked_mul(factor)
        .unwrap_or(config.retry_max_delay)
        .min(config.retry_max_delay)
}

/// Owns retries and finalization for handed-off batches.
pub(crate) struct Flusher {
    pub(crate) config: DispatcherConfig,
    pub(crate) store: Arc<dyn StatusStore>,
    pub(crate) provider: Arc<dyn ProviderClient>,
    pub(crate) statistics: Arc<dyn StatisticsSink>,
}

impl Flusher {
    /// Flush one batch: send with retries, then mark every message terminal.
    pub(crate) async fn flush(&self, batch: Vec<OutboundMessage>) -> FlushReport {
        let max_attempts = effective_max_attempts(self.config.max_attempts);
        let mut attempt = 0;

        let outcome = loop {
            attempt += 1;

            match self.try_send(&batch).await {
                Ok(()) => {
                    debug!(messages = batch.len(), attempt, "Batch accepted by provider");
                    break Ok(());
                }
                Err(e) if attempt >= max_attempts => {
                    error!(
                        messages = batch.len(),
                        attempt,
                        max_attempts,
                        error = %e,
                        "Max attempts exceeded"
                    );
                    break Err(e);
                }
                Err(e) => {
                    let delay = backoff_delay(&self.config, attempt);
                    warn!(
                        messages = batch.len(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Send failed, retrying"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        };

        let status = match outcome {
            Ok(()) => MessageStatus::Delivered,
            Err(_) => MessageStatus::Failed,
        };
        let finalization_errors = self.finalize(&batch, status);

        let report = FlushReport {
            batch,
            error: outcome.err().map(|e| e.to_string()),
            attempt,
            max_attempts,
            finalization_errors,
            completed_at: Utc::now(),
        };
        self.statistics.record(report.clone());
        report
    }

    /// Single provider call bounded by the send timeout.
    async fn try_send(&self, batch: &[OutboundMessage]) -> ProviderResult<()> {
        match tokio::time::timeout(self.config.send_timeout, self.provider.send(batch)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(self.config.send_timeout)),
        }
    }

    /// Apply `status` to every message in insertion order, collecting rejections.
    fn finalize(&self, batch: &[OutboundMessage], status: MessageStatus) -> Vec<FinalizationError> {
        let mut errors = Vec::new();
        for message in batch {
            if let Err(e) = self.store.update_status(&message.id, status) {
                warn!(message_id = %message.id, status = %status, error = %e, "Could not finalize message");
                errors.push(FinalizationError {
                    message_id: message.id,
                    error: e,
                });
            }
        }
        errors
    }
}

/// Worker loop. Exits once every sender is dropped and the channel is drained.
pub(crate) async fn run_flush_worker(
    flusher: Flusher,
    mut batches: mpsc::Receiver<Vec<OutboundMessage>>,
    pending: Arc<Mutex<PendingState>>,
) {
    let mut ticker = flusher
        .config
        .flush_interval
        .filter(|d| !d.is_zero())
        .map(|period| {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

    info!("Flush worker started");

    loop {
        tokio::select! {
            biased;

            batch = batches.recv() => match batch {
                Some(batch) => {
                    flusher.flush(batch).await;
                }
                None => break,
            },

            _ = async {
                match ticker.as_mut() {
                    Some(ticker) => {
                        ticker.tick().await;
                    }
                    None => std::future::pending::<()>().await,
                }
            } => {
                // Skip the tick when a producer holds the lock; it may be
                // waiting on this worker for channel capacity.
                let lingering = match pending.try_lock() {
                    Ok(mut state) if !state.messages.is_empty() => {
                        Some(std::mem::take(&mut state.messages))
                    }
                    _ => None,
                };
                if let Some(batch) = lingering {
                    debug!(messages = batch.len(), "Flushing lingering partial batch");
                    flusher.flush(batch).await;
                }
            }
        }
    }

    info!("Flush worker stopped");
}
