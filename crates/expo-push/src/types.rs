//! Wire types for the Expo push API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────────────────────────────────────

/// One push message as accepted by `POST /--/api/v2/push/send`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpoPushMessage {
    /// Recipient push token
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// JSON object delivered to the app
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// "default" or a bundled sound name (iOS)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    /// "default", "normal" or "high"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// Seconds the message may be redelivered for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// Android notification channel
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
}

impl ExpoPushMessage {
    pub fn new(to: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            title: None,
            body: None,
            data: None,
            sound: None,
            priority: None,
            ttl: None,
            channel_id: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tickets & Receipts
// ─────────────────────────────────────────────────────────────────────────────

/// Error details attached to a ticket or receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExpoErrorDetails {
    /// Machine-readable error code, e.g. "DeviceNotRegistered"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expo_push_token: Option<String>,
}

/// Per-message result of a send request, in request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExpoPushTicket {
    Ok {
        id: String,
    },
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<ExpoErrorDetails>,
    },
}

/// Delivery receipt for a ticket id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExpoPushReceipt {
    Ok,
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        details: Option<ExpoErrorDetails>,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Envelopes
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for `POST /--/api/v2/push/getReceipts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptRequest {
    pub ids: Vec<String>,
}

/// Request-level error entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorEntry {
    pub code: String,
    pub message: String,
}

/// Response envelope shared by both endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ApiErrorEntry>>,
}
