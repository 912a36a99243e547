//! Status store error types.

use crate::{MessageId, MessageStatus};
use thiserror::Error;

/// Status store error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The id was registered before.
    #[error("Message already exists: {0}")]
    AlreadyExists(MessageId),

    /// Update targeted an id that was never registered.
    #[error("Message not found: {0}")]
    NotFound(MessageId),

    /// The message already reached a terminal status.
    #[error("Message {id} is in final state {current}")]
    FinalStateViolation {
        /// Message that was targeted.
        id: MessageId,
        /// Terminal status it is stuck in.
        current: MessageStatus,
    },

    /// The transition is not allowed by the active policy.
    #[error("Message {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: MessageId,
        from: MessageStatus,
        to: MessageStatus,
    },
}

/// Result type alias using StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_state_violation_display() {
        let id = MessageId::new();
        let err = StoreError::FinalStateViolation {
            id,
            current: MessageStatus::Delivered,
        };
        assert_eq!(
            err.to_string(),
            format!("Message {} is in final state DELIVERED", id)
        );
    }

    #[test]
    fn not_found_display() {
        let id = MessageId::new();
        let err = StoreError::NotFound(id);
        assert_eq!(err.to_string(), format!("Message not found: {}", id));
    }
}
