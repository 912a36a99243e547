use serde::{Deserialize, Serialize};
use sms_status_store::MessageId;

/// A message waiting to be sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    #[serde(rename = "messageId")]
    pub id: MessageId,
    pub phone_number: String,
    pub content: String,
}

impl OutboundMessage {
    pub fn new(id: MessageId, phone_number: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            phone_number: phone_number.into(),
            content: content.into(),
        }
    }
}
