//! Proxy error types.

use sms_batch_dispatcher::{DispatchError, ProviderError};
use thiserror::Error;

/// Malformed caller input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid phone number: {0}")]
    InvalidPhoneNumber(String),

    #[error("Message content is empty")]
    EmptyContent,

    #[error("Message content too long: {len} characters (max {max})")]
    ContentTooLong { len: usize, max: usize },

    #[error("Invalid message id: {0}")]
    InvalidMessageId(String),
}

/// Proxy error type.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Caller input was rejected
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Dispatcher refused the message
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// Provider client could not be built
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl ProxyError {
    /// Whether the caller is at fault (maps to a 4xx response).
    pub fn is_client_error(&self) -> bool {
        matches!(self, ProxyError::Validation(_))
    }
}

/// Result type alias using ProxyError.
pub type ProxyResult<T> = Result<T, ProxyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_client_errors() {
        let err: ProxyError = ValidationError::EmptyContent.into();
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "Validation error: Message content is empty");
    }

    #[test]
    fn dispatch_errors_are_server_errors() {
        let err: ProxyError = DispatchError::ShuttingDown.into();
        assert!(!err.is_client_error());
    }

    #[test]
    fn content_too_long_display() {
        let err = ValidationError::ContentTooLong { len: 200, max: 160 };
        assert_eq!(
            err.to_string(),
            "Message content too long: 200 characters (max 160)"
        );
    }
}
