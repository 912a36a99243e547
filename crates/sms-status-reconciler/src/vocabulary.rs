//! Provider status vocabulary.

use crate::ReconcileError;
use sms_status_store::MessageStatus;
use std::str::FromStr;

/// Statuses the provider may report, matched exactly (case-sensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalStatus {
    Accepted,
    Delivered,
    Failed,
}

impl ExternalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExternalStatus::Accepted => "ACCEPTED",
            ExternalStatus::Delivered => "DELIVERED",
            ExternalStatus::Failed => "FAILED",
        }
    }
}

impl FromStr for ExternalStatus {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACCEPTED" => Ok(ExternalStatus::Accepted),
            "DELIVERED" => Ok(ExternalStatus::Delivered),
            "FAILED" => Ok(ExternalStatus::Failed),
            other => Err(ReconcileError::UnknownStatus(other.to_string())),
        }
    }
}

impl From<ExternalStatus> for MessageStatus {
    fn from(status: ExternalStatus) -> Self {
        match status {
            ExternalStatus::Accepted => MessageStatus::Accepted,
            ExternalStatus::Delivered => MessageStatus::Delivered,
            ExternalStatus::Failed => MessageStatus::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_statuses_map_to_internal() {
        for external in [
            ExternalStatus::Accepted,
            ExternalStatus::Delivered,
            ExternalStatus::Failed,
        ] {
            let parsed: ExternalStatus = external.as_str().parse().unwrap();
            let internal = MessageStatus::from(parsed);
            assert_eq!(internal.as_str(), external.as_str());
        }
    }

    #[test]
    fn test_unknown_statuses_are_rejected() {
        for raw in ["NOT_FOUND", "delivered", "QUEUED", "", " DELIVERED"] {
            let err = raw.parse::<ExternalStatus>().unwrap_err();
            assert_eq!(err, ReconcileError::UnknownStatus(raw.to_string()));
        }
    }
}
