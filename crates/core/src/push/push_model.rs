use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::notifications::Notification;

/// Gateway limit on messages per send request.
pub const DEFAULT_MESSAGE_CHUNK_SIZE: usize = 100;

/// Gateway limit on ticket ids per receipt request.
pub const DEFAULT_RECEIPT_CHUNK_SIZE: usize = 300;

/// Key the notification payload is nested under in every outbound message.
/// Mobile clients read `data.withSome`.
pub const PAYLOAD_ENVELOPE_KEY: &str = "withSome";

const DEFAULT_SOUND: &str = "default";

/// Delivery priority requested from the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Default,
    Normal,
    #[default]
    High,
}

/// One outbound notification addressed to a single device token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    pub to: String,
    pub title: String,
    pub body: String,
    pub data: Value,
    pub sound: Option<String>,
    pub priority: Priority,
}

impl PushMessage {
    pub fn for_token(token: &str, notification: &Notification) -> Self {
        Self {
            to: token.to_string(),
            title: notification.title.clone(),
            body: notification.body.clone(),
            data: json!({ PAYLOAD_ENVELOPE_KEY: notification.data }),
            sound: Some(DEFAULT_SOUND.to_string()),
            priority: Priority::High,
        }
    }
}

/// Error code reported by the gateway on a ticket or receipt.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PushErrorCode {
    DeviceNotRegistered,
    MessageTooBig,
    MessageRateExceeded,
    MismatchSenderId,
    InvalidCredentials,
    Other(String),
}

impl PushErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            Self::DeviceNotRegistered => "DeviceNotRegistered",
            Self::MessageTooBig => "MessageTooBig",
            Self::MessageRateExceeded => "MessageRateExceeded",
            Self::MismatchSenderId => "MismatchSenderId",
            Self::InvalidCredentials => "InvalidCredentials",
            Self::Other(code) => code,
        }
    }

    /// True when the device registration no longer exists and the token
    /// must never be used again.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::DeviceNotRegistered)
    }
}

impl From<&str> for PushErrorCode {
    fn from(code: &str) -> Self {
        match code {
            "DeviceNotRegistered" => Self::DeviceNotRegistered,
            "MessageTooBig" => Self::MessageTooBig,
            "MessageRateExceeded" => Self::MessageRateExceeded,
            "MismatchSenderId" => Self::MismatchSenderId,
            "InvalidCredentials" => Self::InvalidCredentials,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for PushErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Synchronous acknowledgement for one message, positionally aligned with
/// the messages of the send request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushTicket {
    Ok {
        id: String,
    },
    Error {
        message: String,
        code: Option<PushErrorCode>,
    },
}

/// Eventual delivery outcome for a previously accepted ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushReceipt {
    Ok,
    Error {
        message: String,
        code: Option<PushErrorCode>,
    },
}

/// Batch sizes used when partitioning messages and receipt ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSizes {
    pub messages: usize,
    pub receipt_ids: usize,
}

impl Default for ChunkSizes {
    fn default() -> Self {
        Self {
            messages: DEFAULT_MESSAGE_CHUNK_SIZE,
            receipt_ids: DEFAULT_RECEIPT_CHUNK_SIZE,
        }
    }
}
