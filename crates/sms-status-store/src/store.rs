//! Status store trait and in-memory implementation.

use crate::{MessageId, MessageStatus, StoreError, StoreResult, TransitionPolicy};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, trace};

/// Per-message status storage shared by the dispatcher and the reconciler.
pub trait StatusStore: Send + Sync {
    /// Register a new message with status `Accepted`.
    ///
    /// Fails with `AlreadyExists` if the id is already known.
    fn register(&self, id: MessageId) -> StoreResult<()>;

    /// Current status of a message, or `NotFound` for unknown ids.
    fn get_status(&self, id: &MessageId) -> MessageStatus;

    /// Move a registered, non-terminal message to `new_status`.
    fn update_status(&self, id: &MessageId, new_status: MessageStatus) -> StoreResult<()>;
}

/// Volatile status store. All history is lost when the process exits.
pub struct InMemoryStatusStore {
    statuses: RwLock<HashMap<MessageId, MessageStatus>>,
    policy: TransitionPolicy,
}

impl InMemoryStatusStore {
    /// Create an empty store with the default transition policy.
    pub fn new() -> Self {
        Self::with_policy(TransitionPolicy::default())
    }

    /// Create an empty store with an explicit transition policy.
    pub fn with_policy(policy: TransitionPolicy) -> Self {
        Self {
            statuses: RwLock::new(HashMap::new()),
            policy,
        }
    }

    /// The active transition policy.
    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Number of registered messages.
    pub fn len(&self) -> usize {
        self.statuses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no message has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryStatusStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusStore for InMemoryStatusStore {
    fn register(&self, id: MessageId) -> StoreResult<()> {
        let mut statuses = self
            .statuses
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        if statuses.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id));
        }
        statuses.insert(id, MessageStatus::Accepted);

        trace!(message_id = %id, "Registered message");
        Ok(())
    }

    fn get_status(&self, id: &MessageId) -> MessageStatus {
        self.statuses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .copied()
            .unwrap_or(MessageStatus::NotFound)
    }

    fn update_status(&self, id: &MessageId, new_status: MessageStatus) -> StoreResult<()> {
        let mut statuses = self
            .statuses
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let current = statuses
            .get_mut(id)
            .ok_or(StoreError::NotFound(*id))?;

        if current.is_terminal() {
            return Err(StoreError::FinalStateViolation {
                id: *id,
                current: *current,
            });
        }

        if !self.policy.allows(*current, new_status) {
            return Err(StoreError::InvalidTransition {
                id: *id,
                from: *current,
                to: new_status,
            });
        }

        debug!(message_id = %id, from = %current, to = %new_status, "Status updated");
        *current = new_status;
        Ok(())
    }
}
