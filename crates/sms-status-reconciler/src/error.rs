//! Reconciler error types.

use crate::StatusUpdateBatch;
use sms_status_store::{MessageId, StoreError};
use thiserror::Error;

/// Why a single status update could not be applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// The provider used a status outside the known vocabulary.
    #[error("Cannot map status {0} to any known status")]
    UnknownStatus(String),

    /// The store rejected the update.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// A failed entry, reported on the reconciler's error channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Status update {external_status} for {message_id} failed: {error}")]
pub struct StatusUpdateError {
    pub error: ReconcileError,
    pub message_id: MessageId,
    /// Status exactly as the provider sent it.
    pub external_status: String,
}

/// A batch that could not be submitted. The batch is handed back untouched.
#[derive(Error, Debug)]
pub enum SubmitError {
    /// The input channel is at capacity.
    #[error("Reconciler input is full")]
    Full(StatusUpdateBatch),

    /// The reconciler has stopped.
    #[error("Reconciler is closed")]
    Closed(StatusUpdateBatch),
}

impl SubmitError {
    /// Recover the rejected batch.
    pub fn into_batch(self) -> StatusUpdateBatch {
        match self {
            SubmitError::Full(batch) | SubmitError::Closed(batch) => batch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_status_display() {
        let err = ReconcileError::UnknownStatus("QUEUED".to_string());
        assert_eq!(err.to_string(), "Cannot map status QUEUED to any known status");
    }

    #[test]
    fn status_update_error_display() {
        let id = MessageId::new();
        let err = StatusUpdateError {
            error: ReconcileError::Store(StoreError::NotFound(id)),
            message_id: id,
            external_status: "DELIVERED".to_string(),
        };
        assert_eq!(
            err.to_string(),
            format!(
                "Status update DELIVERED for {id} failed: Store error: Message not found: {id}"
            )
        );
    }
}
