//! `PushProvider` implementation backed by the Expo gateway.

use std::collections::HashMap;

use async_trait::async_trait;
use pushwatch_core::push::{
    ChunkSizes, Priority, PushErrorCode, PushMessage, PushProvider, PushReceipt, PushTicket,
};

use crate::client::{
    ExpoPushClient, PUSH_NOTIFICATION_CHUNK_LIMIT, PUSH_NOTIFICATION_RECEIPT_CHUNK_LIMIT,
};
use crate::token::is_expo_push_token;
use crate::types::{ExpoErrorDetails, ExpoPushMessage, ExpoPushReceipt, ExpoPushTicket};

fn priority_str(priority: Priority) -> &'static str {
    match priority {
        Priority::Default => "default",
        Priority::Normal => "normal",
        Priority::High => "high",
    }
}

impl From<&PushMessage> for ExpoPushMessage {
    fn from(message: &PushMessage) -> Self {
        let mut expo = ExpoPushMessage::new(message.to.clone());
        expo.title = Some(message.title.clone());
        expo.body = Some(message.body.clone());
        expo.data = Some(message.data.clone());
        expo.sound = message.sound.clone();
        expo.priority = Some(priority_str(message.priority).to_string());
        expo
    }
}

fn error_code(details: Option<ExpoErrorDetails>) -> Option<PushErrorCode> {
    details
        .and_then(|d| d.error)
        .map(|code| PushErrorCode::from(code.as_str()))
}

impl From<ExpoPushTicket> for PushTicket {
    fn from(ticket: ExpoPushTicket) -> Self {
        match ticket {
            ExpoPushTicket::Ok { id } => PushTicket::Ok { id },
            ExpoPushTicket::Error { message, details } => PushTicket::Error {
                message,
                code: error_code(details),
            },
        }
    }
}

impl From<ExpoPushReceipt> for PushReceipt {
    fn from(receipt: ExpoPushReceipt) -> Self {
        match receipt {
            ExpoPushReceipt::Ok => PushReceipt::Ok,
            ExpoPushReceipt::Error { message, details } => PushReceipt::Error {
                message,
                code: error_code(details),
            },
        }
    }
}

#[async_trait]
impl PushProvider for ExpoPushClient {
    fn is_valid_token(&self, token: &str) -> bool {
        is_expo_push_token(token)
    }

    fn chunk_limits(&self) -> ChunkSizes {
        ChunkSizes {
            messages: PUSH_NOTIFICATION_CHUNK_LIMIT,
            receipt_ids: PUSH_NOTIFICATION_RECEIPT_CHUNK_LIMIT,
        }
    }

    async fn send(&self, messages: &[PushMessage]) -> pushwatch_core::Result<Vec<PushTicket>> {
        let expo_messages: Vec<ExpoPushMessage> = messages.iter().map(Into::into).collect();
        let tickets = self.send_push_notifications(&expo_messages).await?;
        Ok(tickets.into_iter().map(Into::into).collect())
    }

    async fn fetch_receipts(
        &self,
        ticket_ids: &[String],
    ) -> pushwatch_core::Result<HashMap<String, PushReceipt>> {
        let receipts = self.get_push_notification_receipts(ticket_ids).await?;
        Ok(receipts
            .into_iter()
            .map(|(id, receipt)| (id, receipt.into()))
            .collect())
    }
}
