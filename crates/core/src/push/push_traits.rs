use std::collections::HashMap;

use async_trait::async_trait;

use super::{ChunkSizes, PushMessage, PushReceipt, PushTicket};
use crate::errors::Result;

/// Trait for a push delivery gateway.
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Structural format check for a device token. Tokens failing it are never sent.
    fn is_valid_token(&self, token: &str) -> bool;

    /// Request size limits of the gateway.
    fn chunk_limits(&self) -> ChunkSizes {
        ChunkSizes::default()
    }

    /// Submits one chunk. Returns one ticket per message, in message order.
    async fn send(&self, messages: &[PushMessage]) -> Result<Vec<PushTicket>>;

    /// Fetches receipts for the given ticket ids. Ids without a receipt yet are absent.
    async fn fetch_receipts(&self, ticket_ids: &[String]) -> Result<HashMap<String, PushReceipt>>;
}
