//! Dispatcher and provider error types.

use sms_status_store::StoreError;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by a provider client for a whole batch.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Transport-level HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Provider rejected batch: {status} - {body}")]
    Rejected { status: u16, body: String },

    /// Provider did not answer within the send timeout
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Any other send failure
    #[error("Send failed: {0}")]
    Send(String),
}

/// Result type alias using ProviderError.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors surfaced to callers of the dispatcher.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Registration in the status store failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The dispatcher no longer accepts messages
    #[error("Dispatcher is shutting down")]
    ShuttingDown,
}

/// Result type alias using DispatchError.
pub type DispatchResult<T> = Result<T, DispatchError>;
