//! Background task applying provider status batches to the store.

use crate::{ExternalStatus, ReconcileError, StatusUpdateError, SubmitError};
use serde::{Deserialize, Serialize};
use sms_status_store::{MessageId, MessageStatus, StatusStore};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// One entry of a provider status batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub message_id: MessageId,
    /// Status in the provider's vocabulary.
    pub status: String,
}

impl StatusUpdate {
    pub fn new(message_id: MessageId, status: impl Into<String>) -> Self {
        Self {
            message_id,
            status: status.into(),
        }
    }
}

/// Status updates in arrival order.
pub type StatusUpdateBatch = Vec<StatusUpdate>;

/// Channel sizing for the reconciler.
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Batches that may wait before `send` applies backpressure.
    pub input_capacity: usize,
    /// Errors kept for the consumer before new ones are dropped.
    pub error_capacity: usize,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            input_capacity: 1024,
            error_capacity: 1024,
        }
    }
}

/// Cloneable handle the provider integration pushes status batches into.
#[derive(Clone)]
pub struct StatusUpdateSender {
    tx: mpsc::Sender<StatusUpdateBatch>,
}

impl StatusUpdateSender {
    /// Submit a batch, waiting for capacity. A batch is never dropped.
    pub async fn send(&self, batch: StatusUpdateBatch) -> Result<(), SubmitError> {
        self.tx
            .send(batch)
            .await
            .map_err(|mpsc::error::SendError(batch)| SubmitError::Closed(batch))
    }

    /// Submit a batch without waiting. On failure the batch is handed back.
    pub fn try_send(&self, batch: StatusUpdateBatch) -> Result<(), SubmitError> {
        self.tx.try_send(batch).map_err(|e| match e {
            mpsc::error::TrySendError::Full(batch) => SubmitError::Full(batch),
            mpsc::error::TrySendError::Closed(batch) => SubmitError::Closed(batch),
        })
    }
}

/// Reconciles provider status batches into the status store.
///
/// # Lifecycle
///
/// 1. [`StatusReconciler::start`] spawns the background task
/// 2. The provider integration submits batches through [`StatusReconciler::sender`]
/// 3. The owner drains [`StatusReconciler::take_errors`]
/// 4. [`StatusReconciler::shutdown`] applies already-queued batches and stops
pub struct StatusReconciler {
    sender: StatusUpdateSender,
    errors: std::sync::Mutex<Option<mpsc::Receiver<StatusUpdateError>>>,
    shutdown_tx: broadcast::Sender<()>,
    dropped_errors: Arc<AtomicU64>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StatusReconciler {
    /// Spawn the reconciler task. Must be called from within a tokio runtime.
    pub fn start(store: Arc<dyn StatusStore>, config: ReconcilerConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.input_capacity.max(1));
        let (errors_tx, errors_rx) = mpsc::channel(config.error_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let dropped_errors = Arc::new(AtomicU64::new(0));

        let worker = Worker {
            store,
            errors: errors_tx,
            dropped_errors: dropped_errors.clone(),
        };
        let task = tokio::spawn(worker.run(rx, shutdown_rx));

        info!(
            input_capacity = config.input_capacity,
            error_capacity = config.error_capacity,
            "Status reconciler started"
        );

        Self {
            sender: StatusUpdateSender { tx },
            errors: std::sync::Mutex::new(Some(errors_rx)),
            shutdown_tx,
            dropped_errors,
            task: Mutex::new(Some(task)),
        }
    }

    /// Handle for submitting status batches.
    pub fn sender(&self) -> StatusUpdateSender {
        self.sender.clone()
    }

    /// Take the error receiver. Returns `None` after the first call.
    pub fn take_errors(&self) -> Option<mpsc::Receiver<StatusUpdateError>> {
        self.errors
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take()
    }

    /// Errors discarded because the error channel was full or unread.
    pub fn dropped_errors(&self) -> u64 {
        self.dropped_errors.load(Ordering::Relaxed)
    }

    /// Signal shutdown and wait for the task to finish.
    ///
    /// Batches queued before the signal are still applied.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());

        let task = self.task.lock().await.take();
        if let Some(handle) = task {
            if let Err(e) = handle.await {
                error!(error = %e, "Status reconciler panicked");
            }
        }
    }
}

struct Worker {
    store: Arc<dyn StatusStore>,
    errors: mpsc::Sender<StatusUpdateError>,
    dropped_errors: Arc<AtomicU64>,
}

impl Worker {
    async fn run(
        self,
        mut batches: mpsc::Receiver<StatusUpdateBatch>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                biased;

                _ = shutdown_rx.recv() => {
                    batches.close();
                    while let Some(batch) = batches.recv().await {
                        self.apply(batch);
                    }
                    info!("Status reconciler shutting down");
                    break;
                }

                batch = batches.recv() => match batch {
                    Some(batch) => self.apply(batch),
                    None => {
                        info!("Status update channel closed");
                        break;
                    }
                },
            }
        }
    }

    fn apply(&self, batch: StatusUpdateBatch) {
        debug!(updates = batch.len(), "Applying status batch");

        for update in batch {
            if let Err(error) = self.apply_one(&update) {
                self.report(StatusUpdateError {
                    error,
                    message_id: update.message_id,
                    external_status: update.status,
                });
            }
        }
    }

    fn apply_one(&self, update: &StatusUpdate) -> Result<(), ReconcileError> {
        let status: MessageStatus = update.status.parse::<ExternalStatus>()?.into();
        self.store.update_status(&update.message_id, status)?;
        Ok(())
    }

    /// Never blocks: a full or unread error channel drops the error.
    fn report(&self, failure: StatusUpdateError) {
        debug!(message_id = %failure.message_id, error = %failure.error, "Status update rejected");

        match self.errors.try_send(failure) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(failure)) => {
                self.dropped_errors.fetch_add(1, Ordering::Relaxed);
                error!(
                    message_id = %failure.message_id,
                    external_status = %failure.external_status,
                    error = %failure.error,
                    "Error channel full, dropping status update error"
                );
            }
            Err(mpsc::error::TrySendError::Closed(failure)) => {
                self.dropped_errors.fetch_add(1, Ordering::Relaxed);
                warn!(
                    message_id = %failure.message_id,
                    external_status = %failure.external_status,
                    error = %failure.error,
                    "No error consumer, dropping status update error"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sms_status_store::{InMemoryStatusStore, StoreError};
    use std::time::Duration;

    fn setup(config: ReconcilerConfig) -> (Arc<InMemoryStatusStore>, StatusReconciler) {
        let store = Arc::new(InMemoryStatusStore::new());
        let reconciler = StatusReconciler::start(store.clone(), config);
        (store, reconciler)
    }

    fn registered(store: &InMemoryStatusStore) -> MessageId {
        let id = MessageId::new();
        store.register(id).unwrap();
        id
    }

    async fn next_error(rx: &mut mpsc::Receiver<StatusUpdateError>) -> StatusUpdateError {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for status update error")
            .expect("error channel closed")
    }

    #[tokio::test]
    async fn test_valid_update_is_applied() {
        let (store, reconciler) = setup(ReconcilerConfig::default());
        let id = registered(&store);

        reconciler
            .sender()
            .send(vec![StatusUpdate::new(id, "DELIVERED")])
            .await
            .unwrap();
        reconciler.shutdown().await;

        assert_eq!(store.get_status(&id), MessageStatus::Delivered);
        assert_eq!(reconciler.dropped_errors(), 0);
    }

    #[tokio::test]
    async fn test_bad_entry_does_not_affect_valid_entry() {
        for bad_first in [true, false] {
            let (store, reconciler) = setup(ReconcilerConfig::default());
            let mut errors = reconciler.take_errors().unwrap();
            let good = registered(&store);
            let bad = registered(&store);

            let mut batch = vec![
                StatusUpdate::new(bad, "SOMETHING_ELSE"),
                StatusUpdate::new(good, "FAILED"),
            ];
            if !bad_first {
                batch.reverse();
            }
            reconciler.sender().send(batch).await.unwrap();

            let err = next_error(&mut errors).await;
            assert_eq!(
                err,
                StatusUpdateError {
                    error: ReconcileError::UnknownStatus("SOMETHING_ELSE".to_string()),
                    message_id: bad,
                    external_status: "SOMETHING_ELSE".to_string(),
                }
            );

            reconciler.shutdown().await;
            assert_eq!(store.get_status(&good), MessageStatus::Failed);
            assert_eq!(store.get_status(&bad), MessageStatus::Accepted);
            assert!(errors.try_recv().is_err());
        }
    }

    #[tokio::test]
    async fn test_store_rejections_are_reported() {
        let (store, reconciler) = setup(ReconcilerConfig::default());
        let mut errors = reconciler.take_errors().unwrap();
        let done = registered(&store);
        store.update_status(&done, MessageStatus::Delivered).unwrap();
        let unknown = MessageId::new();

        reconciler
            .sender()
            .send(vec![
                StatusUpdate::new(done, "FAILED"),
                StatusUpdate::new(unknown, "DELIVERED"),
            ])
            .await
            .unwrap();

        let first = next_error(&mut errors).await;
        assert_eq!(first.message_id, done);
        assert_eq!(
            first.error,
            ReconcileError::Store(StoreError::FinalStateViolation {
                id: done,
                current: MessageStatus::Delivered,
            })
        );

        let second = next_error(&mut errors).await;
        assert_eq!(second.message_id, unknown);
        assert_eq!(
            second.error,
            ReconcileError::Store(StoreError::NotFound(unknown))
        );

        reconciler.shutdown().await;
        assert_eq!(store.get_status(&done), MessageStatus::Delivered);
        assert_eq!(store.get_status(&unknown), MessageStatus::NotFound);
    }

    #[tokio::test]
    async fn test_full_error_channel_never_blocks() {
        let (store, reconciler) = setup(ReconcilerConfig {
            input_capacity: 8,
            error_capacity: 1,
        });
        let _errors = reconciler.take_errors().unwrap();
        let bad: Vec<_> = (0..3).map(|_| StatusUpdate::new(MessageId::new(), "DELIVERED")).collect();
        let good = registered(&store);

        reconciler.sender().send(bad).await.unwrap();
        reconciler
            .sender()
            .send(vec![StatusUpdate::new(good, "DELIVERED")])
            .await
            .unwrap();
        reconciler.shutdown().await;

        assert_eq!(store.get_status(&good), MessageStatus::Delivered);
        assert_eq!(reconciler.dropped_errors(), 2);
    }

    #[tokio::test]
    async fn test_errors_without_consumer_are_counted() {
        let (store, reconciler) = setup(ReconcilerConfig::default());
        drop(reconciler.take_errors());
        let id = MessageId::new();

        reconciler
            .sender()
            .send(vec![StatusUpdate::new(id, "DELIVERED")])
            .await
            .unwrap();
        reconciler.shutdown().await;

        assert_eq!(reconciler.dropped_errors(), 1);
        assert_eq!(store.get_status(&id), MessageStatus::NotFound);
    }

    #[tokio::test]
    async fn test_send_after_shutdown_returns_batch() {
        let (store, reconciler) = setup(ReconcilerConfig::default());
        let id = registered(&store);
        reconciler.shutdown().await;

        let err = reconciler
            .sender()
            .send(vec![StatusUpdate::new(id, "DELIVERED")])
            .await
            .unwrap_err();
        assert!(matches!(err, SubmitError::Closed(_)));
        assert_eq!(err.into_batch()[0].message_id, id);
        assert_eq!(store.get_status(&id), MessageStatus::Accepted);
    }

    #[tokio::test]
    async fn test_try_send_reports_closed() {
        let (store, reconciler) = setup(ReconcilerConfig::default());
        let id = registered(&store);
        reconciler.shutdown().await;

        let err = reconciler
            .sender()
            .try_send(vec![StatusUpdate::new(id, "DELIVERED")])
            .unwrap_err();
        assert!(matches!(err, SubmitError::Closed(_)));
    }

    #[tokio::test]
    async fn test_take_errors_only_once() {
        let (_store, reconciler) = setup(ReconcilerConfig::default());
        assert!(reconciler.take_errors().is_some());
        assert!(reconciler.take_errors().is_none());
        reconciler.shutdown().await;
    }

    #[test]
    fn test_status_update_json_shape() {
        let id = MessageId::new();
        let json = format!(r#"{{"messageId":"{}","status":"DELIVERED"}}"#, id);
        let update: StatusUpdate = serde_json::from_str(&json).unwrap();
        assert_eq!(update, StatusUpdate::new(id, "DELIVERED"));
    }

    #[test]
    fn test_reconciler_config_default() {
        let config = ReconcilerConfig::default();
        assert_eq!(config.input_capacity, 1024);
        assert_eq!(config.error_capacity, 1024);
    }
}
