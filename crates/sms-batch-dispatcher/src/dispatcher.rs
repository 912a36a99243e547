//! Batching dispatcher: buffers messages and hands full batches to the flush worker.

use crate::worker::{run_flush_worker, Flusher};
use crate::{
    DispatchError, DispatchResult, DispatcherConfig, OutboundMessage, ProviderClient,
    StatisticsSink,
};
use sms_status_store::{MessageStatus, StatusStore};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// State guarded by the dispatcher lock.
pub(crate) struct PendingState {
    /// Messages waiting for the batch to fill, in enqueue order.
    pub(crate) messages: Vec<OutboundMessage>,
    /// Hand-off to the flush worker. `None` once shutdown started.
    flush_tx: Option<mpsc::Sender<Vec<OutboundMessage>>>,
}

/// Buffers outbound messages and flushes them in batches.
///
/// The lock is held only for registration, append and hand-off; provider
/// latency is paid by the flush worker, never by producers. Producers block
/// only when `queue_capacity` batches are already waiting.
pub struct BatchingDispatcher {
    min_batch_size: usize,
    store: Arc<dyn StatusStore>,
    pending: Arc<Mutex<PendingState>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl BatchingDispatcher {
    /// Create the dispatcher and spawn its flush worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        config: DispatcherConfig,
        store: Arc<dyn StatusStore>,
        provider: Arc<dyn ProviderClient>,
        statistics: Arc<dyn StatisticsSink>,
    ) -> Self {
        let (flush_tx, flush_rx) = mpsc::channel(config.queue_capacity.max(1));
        let pending = Arc::new(Mutex::new(PendingState {
            messages: Vec::new(),
            flush_tx: Some(flush_tx),
        }));

        info!(
            min_batch_size = config.min_batch_size,
            max_attempts = config.max_attempts,
            queue_capacity = config.queue_capacity,
            "Starting batching dispatcher"
        );

        let min_batch_size = config.min_batch_size.max(1);
        let flusher = Flusher {
            config,
            store: store.clone(),
            provider,
            statistics,
        };
        let worker = tokio::spawn(run_flush_worker(flusher, flush_rx, pending.clone()));

        Self {
            min_batch_size,
            store,
            pending,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Register a message and add it to the pending batch.
    ///
    /// When the batch reaches `min_batch_size` it is handed to the flush
    /// worker. The flush outcome is never reported here; it ends up in the
    /// status store and the statistics sink. If the worker is gone the batch
    /// is marked `Failed` and the enqueue still succeeds.
    pub async fn enqueue(&self, message: OutboundMessage) -> DispatchResult<()> {
        let mut guard = self.pending.lock().await;
        let state = &mut *guard;

        let Some(flush_tx) = state.flush_tx.as_ref() else {
            return Err(DispatchError::ShuttingDown);
        };

        self.store.register(message.id)?;
        debug!(message_id = %message.id, pending = state.messages.len() + 1, "Enqueued message");
        state.messages.push(message);

        if state.messages.len() < self.min_batch_size {
            return Ok(());
        }

        // Messages stay pending until channel capacity is reserved, so a
        // cancelled enqueue leaves them for the next hand-off or shutdown.
        match flush_tx.reserve().await {
            Ok(permit) => {
                let batch = std::mem::take(&mut state.messages);
                debug!(messages = batch.len(), "Batch threshold reached");
                permit.send(batch);
            }
            Err(_) => {
                let batch = std::mem::take(&mut state.messages);
                error!(messages = batch.len(), "Flush worker is gone, failing batch");
                self.fail_unsent(&batch);
            }
        }

        Ok(())
    }

    /// Number of messages waiting for the batch to fill.
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.messages.len()
    }

    /// Stop accepting messages, flush what is pending and wait for the worker.
    ///
    /// Every registered message ends in a terminal status once this returns.
    pub async fn shutdown(&self) {
        {
            let mut state = self.pending.lock().await;
            let Some(flush_tx) = state.flush_tx.take() else {
                return;
            };

            if !state.messages.is_empty() {
                match flush_tx.reserve().await {
                    Ok(permit) => {
                        let remainder = std::mem::take(&mut state.messages);
                        info!(messages = remainder.len(), "Flushing partial batch on shutdown");
                        permit.send(remainder);
                    }
                    Err(_) => {
                        let remainder = std::mem::take(&mut state.messages);
                        error!(messages = remainder.len(), "Flush worker is gone, failing partial batch");
                        self.fail_unsent(&remainder);
                    }
                }
            }
            // Dropping the last sender lets the worker drain and exit
        }

        let worker = self.worker.lock().await.take();
        if let Some(handle) = worker {
            if let Err(e) = handle.await {
                error!(error = %e, "Flush worker panicked");
            }
        }

        info!("Batching dispatcher stopped");
    }

    fn fail_unsent(&self, batch: &[OutboundMessage]) {
        for message in batch {
            if let Err(e) = self.store.update_status(&message.id, MessageStatus::Failed) {
                warn!(message_id = %message.id, error = %e, "Could not fail unsent message");
            }
        }
    }
}
