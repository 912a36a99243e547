//! Message identity and lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique message identifier, assigned before enqueue and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for MessageId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Lifecycle status of a message.
///
/// `NotFound` is only ever returned by lookups; it is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageStatus {
    Accepted,
    Delivered,
    Failed,
    NotFound,
}

impl MessageStatus {
    /// Every status, in declaration order.
    pub const ALL: [MessageStatus; 4] = [
        MessageStatus::Accepted,
        MessageStatus::Delivered,
        MessageStatus::Failed,
        MessageStatus::NotFound,
    ];

    /// Convert to the wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Accepted => "ACCEPTED",
            MessageStatus::Delivered => "DELIVERED",
            MessageStatus::Failed => "FAILED",
            MessageStatus::NotFound => "NOT_FOUND",
        }
    }

    /// Whether no further transition is permitted.
    pub fn is_terminal(&self) -> bool {
        matches!(self, MessageStatus::Delivered | MessageStatus::Failed)
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which non-terminal transitions the store accepts.
///
/// Terminal statuses are immutable under every policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Any update of a non-terminal message is accepted.
    #[default]
    TerminalOnly,
    /// Only `Accepted -> Delivered` and `Accepted -> Failed`.
    Strict,
}

impl TransitionPolicy {
    /// Check a transition out of a non-terminal status.
    pub fn allows(&self, from: MessageStatus, to: MessageStatus) -> bool {
        if to == MessageStatus::NotFound {
            return false;
        }
        match self {
            TransitionPolicy::TerminalOnly => true,
            TransitionPolicy::Strict => from == MessageStatus::Accepted && to.is_terminal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_strings() {
        assert_eq!(MessageStatus::Accepted.as_str(), "ACCEPTED");
        assert_eq!(MessageStatus::Delivered.to_string(), "DELIVERED");
        assert_eq!(MessageStatus::Failed.to_string(), "FAILED");
        assert_eq!(MessageStatus::NotFound.to_string(), "NOT_FOUND");
    }

    #[test]
    fn test_status_serde_matches_display() {
        for status in MessageStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status));
        }
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!MessageStatus::Accepted.is_terminal());
        assert!(MessageStatus::Delivered.is_terminal());
        assert!(MessageStatus::Failed.is_terminal());
        assert!(!MessageStatus::NotFound.is_terminal());
    }

    #[test]
    fn test_message_id_parse_roundtrip() {
        let id = MessageId::new();
        let parsed: MessageId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<MessageId>().is_err());
    }

    #[test]
    fn test_message_id_serializes_as_string() {
        let id = MessageId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }

    #[test]
    fn test_terminal_only_policy() {
        let policy = TransitionPolicy::TerminalOnly;
        assert!(policy.allows(MessageStatus::Accepted, MessageStatus::Accepted));
        assert!(policy.allows(MessageStatus::Accepted, MessageStatus::Delivered));
        assert!(!policy.allows(MessageStatus::Accepted, MessageStatus::NotFound));
    }

    #[test]
    fn test_strict_policy() {
        let policy = TransitionPolicy::Strict;
        assert!(!policy.allows(MessageStatus::Accepted, MessageStatus::Accepted));
        assert!(policy.allows(MessageStatus::Accepted, MessageStatus::Failed));
        assert!(policy.allows(MessageStatus::Accepted, MessageStatus::Delivered));
    }

    #[test]
    fn test_policy_default_and_serde() {
        assert_eq!(TransitionPolicy::default(), TransitionPolicy::TerminalOnly);
        let policy: TransitionPolicy = serde_json::from_str("\"strict\"").unwrap();
        assert_eq!(policy, TransitionPolicy::Strict);
    }
}
