//! Request and response shapes exchanged with the HTTP layer.

use serde::{Deserialize, Serialize};
use sms_status_store::MessageId;

/// A request to send one SMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    pub phone_number: String,
    pub content: String,
}

impl SendMessage {
    pub fn new(phone_number: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            content: content.into(),
        }
    }
}

/// Returned for an accepted send; the id can be polled for status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendingResult {
    pub id: MessageId,
}

/// Body of a status lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsStatusResponse {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_message_from_json() {
        let msg: SendMessage =
            serde_json::from_str(r#"{"phoneNumber":"+48123456789","content":"hi"}"#).unwrap();
        assert_eq!(msg, SendMessage::new("+48123456789", "hi"));
    }

    #[test]
    fn test_sending_result_json() {
        let id = MessageId::new();
        let json = serde_json::to_string(&SendingResult { id }).unwrap();
        assert_eq!(json, format!(r#"{{"id":"{}"}}"#, id));
    }
}
