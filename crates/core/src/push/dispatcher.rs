//! Push dispatcher: fan a notification out to every stored device token.
//!
//! The flow for one dispatch:
//!
//! ```text
//! list tokens → format check → one message per token (token order kept)
//!      → contiguous chunks → send → tickets (by position) → receipt ids
//!      → receipt chunks → receipts → prune permanently invalid tokens
//! ```
//!
//! Tickets come back positionally aligned with the messages of their chunk,
//! so the global offset of a chunk is what ties a ticket to its token. Every
//! failure is logged and swallowed; a dispatch never returns an error.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::{debug, error, info, warn};

use super::{chunk_contiguous, ChunkSizes, PushMessage, PushProvider, PushReceipt, PushTicket};
use crate::notifications::Notification;
use crate::tokens::TokenStoreTrait;

/// Outcome of one dispatch, for logging and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Tokens that passed the format check, in send order.
    pub recipients: Vec<String>,
    /// Tokens dropped by the format check.
    pub skipped_invalid: Vec<String>,
    /// Send requests that failed as a whole.
    pub failed_chunks: usize,
    /// Tickets that came back with an error.
    pub ticket_errors: usize,
    /// Accepted tickets as `(ticket id, token)`, in send order.
    pub tracked: Vec<(String, String)>,
    /// Receipts that came back with an error.
    pub receipt_errors: usize,
    /// Tokens handed to the store for removal, each at most once.
    pub removed: Vec<String>,
}

/// Sends notifications to every stored device and prunes dead tokens.
pub struct PushDispatcher {
    token_store: Arc<dyn TokenStoreTrait>,
    provider: Arc<dyn PushProvider>,
    chunk_sizes: ChunkSizes,
}

/// Per-dispatch bookkeeping. Never shared between dispatches.
#[derive(Default)]
struct DispatchState {
    summary: DispatchSummary,
    ticket_to_token: HashMap<String, String>,
    pruned: HashSet<String>,
}

impl PushDispatcher {
    pub fn new(token_store: Arc<dyn TokenStoreTrait>, provider: Arc<dyn PushProvider>) -> Self {
        let chunk_sizes = provider.chunk_limits();
        Self {
            token_store,
            provider,
            chunk_sizes,
        }
    }

    /// Overrides the provider's request size limits.
    pub fn with_chunk_sizes(mut self, chunk_sizes: ChunkSizes) -> Self {
        self.chunk_sizes = chunk_sizes;
        self
    }

    pub fn chunk_sizes(&self) -> ChunkSizes {
        self.chunk_sizes
    }

    /// Delivers `notification` to every valid stored token.
    pub async fn dispatch(&self, notification: &Notification) -> DispatchSummary {
        let mut state = DispatchState::default();

        let tokens = match self.token_store.list_tokens().await {
            Ok(tokens) => tokens,
            Err(e) => {
                error!("[push] Failed to load stored tokens: {}", e);
                return state.summary;
            }
        };
        if tokens.is_empty() {
            warn!("[push] No stored push tokens to send to.");
            return state.summary;
        }

        let messages = self.build_messages(tokens, notification, &mut state);
        if messages.is_empty() {
            warn!("[push] No valid messages to send.");
            return state.summary;
        }

        self.send_chunks(&messages, &mut state).await;
        self.reconcile_receipts(&mut state).await;

        info!(
            "[push] Dispatched '{}' to {} device(s): {} tracked, {} ticket error(s), {} receipt error(s), {} removed",
            notification.title,
            state.summary.recipients.len(),
            state.summary.tracked.len(),
            state.summary.ticket_errors,
            state.summary.receipt_errors,
            state.summary.removed.len(),
        );
        state.summary
    }

    fn build_messages(
        &self,
        tokens: Vec<String>,
        notification: &Notification,
        state: &mut DispatchState,
    ) -> Vec<PushMessage> {
        let mut messages = Vec::with_capacity(tokens.len());
        for token in tokens {
            if !self.provider.is_valid_token(&token) {
                warn!("[push] Invalid push token skipped: {}", token);
                state.summary.skipped_invalid.push(token);
                continue;
            }
            messages.push(PushMessage::for_token(&token, notification));
            state.summary.recipients.push(token);
        }
        messages
    }

    async fn send_chunks(&self, messages: &[PushMessage], state: &mut DispatchState) {
        let mut offset = 0usize;

        for chunk in chunk_contiguous(messages, self.chunk_sizes.messages) {
            match self.provider.send(chunk).await {
                Ok(tickets) => {
                    if tickets.len() != chunk.len() {
                        warn!(
                            "[push] Expected {} ticket(s) for chunk at offset {}, got {}",
                            chunk.len(),
                            offset,
                            tickets.len()
                        );
                    }
                    for (i, ticket) in tickets.into_iter().take(chunk.len()).enumerate() {
                        let token = state.summary.recipients[offset + i].clone();
                        self.handle_ticket(ticket, token, state).await;
                    }
                }
                Err(e) => {
                    error!("[push] Send chunk error at offset {}: {}", offset, e);
                    state.summary.failed_chunks += 1;
                }
            }
            offset += chunk.len();
        }
    }

    async fn handle_ticket(&self, ticket: PushTicket, token: String, state: &mut DispatchState) {
        match ticket {
            PushTicket::Ok { id } => {
                state.ticket_to_token.insert(id.clone(), token.clone());
                state.summary.tracked.push((id, token));
            }
            PushTicket::Error { message, code } => {
                state.summary.ticket_errors += 1;
                error!(
                    "[push] Ticket error for {}: {} ({})",
                    token,
                    message,
                    code.as_ref().map(|c| c.as_str()).unwrap_or("no code")
                );
                if code.is_some_and(|c| c.is_permanent()) {
                    self.prune(&token, state).await;
                }
            }
        }
    }

    async fn reconcile_receipts(&self, state: &mut DispatchState) {
        if state.summary.tracked.is_empty() {
            return;
        }
        let ticket_ids: Vec<String> = state
            .summary
            .tracked
            .iter()
            .map(|(id, _)| id.clone())
            .collect();

        for chunk in chunk_contiguous(&ticket_ids, self.chunk_sizes.receipt_ids) {
            let receipts = match self.provider.fetch_receipts(chunk).await {
                Ok(receipts) => receipts,
                Err(e) => {
                    error!("[push] Get receipts error: {}", e);
                    continue;
                }
            };

            for id in chunk {
                let Some(PushReceipt::Error { message, code }) = receipts.get(id) else {
                    continue;
                };
                let Some(token) = state.ticket_to_token.get(id).cloned() else {
                    continue;
                };
                state.summary.receipt_errors += 1;
                error!(
                    "[push] Receipt error for {}: {} ({})",
                    token,
                    message,
                    code.as_ref().map(|c| c.as_str()).unwrap_or("no code")
                );
                if code.as_ref().is_some_and(|c| c.is_permanent()) {
                    self.prune(&token, state).await;
                }
            }
        }
    }

    /// Removes `token` from the store at most once per dispatch.
    async fn prune(&self, token: &str, state: &mut DispatchState) {
        if !state.pruned.insert(token.to_string()) {
            debug!("[push] Token {} already removed in this dispatch", token);
            return;
        }
        state.summary.removed.push(token.to_string());
        match self.token_store.remove_token(token).await {
            Ok(count) => info!("[push] Removed invalid token {} ({} record(s))", token, count),
            Err(e) => error!("[push] Failed to remove token {}: {}", token, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::push::{MockPushProvider, PushErrorCode};
    use crate::tokens::MemoryTokenStore;
    use crate::Error;
    use serde_json::json;

    fn notification() -> Notification {
        Notification::new("BUY", "BUY AAPL @ 1", json!({ "type": "signal" }))
    }

    fn dispatcher(
        store: &Arc<MemoryTokenStore>,
        provider: &Arc<MockPushProvider>,
        sizes: ChunkSizes,
    ) -> PushDispatcher {
        PushDispatcher::new(store.clone(), provider.clone()).with_chunk_sizes(sizes)
    }

    fn not_registered() -> Option<PushErrorCode> {
        Some(PushErrorCode::DeviceNotRegistered)
    }

    #[tokio::test]
    async fn test_invalid_tokens_are_dropped_in_order() {
        let store = Arc::new(MemoryTokenStore::new(["A", "B", "C"]));
        let provider = Arc::new(MockPushProvider::new().with_invalid_tokens(["B"]));
        let summary = dispatcher(&store, &provider, ChunkSizes::default())
            .dispatch(&notification())
            .await;

        assert_eq!(summary.recipients, vec!["A", "C"]);
        assert_eq!(summary.skipped_invalid, vec!["B"]);
        let sent: Vec<String> = provider.sent_messages().into_iter().map(|m| m.to).collect();
        assert_eq!(sent, vec!["A", "C"]);
    }

    #[tokio::test]
    async fn test_send_time_not_registered_removes_token() {
        let store = Arc::new(MemoryTokenStore::new(["A", "B"]));
        let provider = Arc::new(MockPushProvider::new());
        provider.script_send(Ok(vec![
            PushTicket::Ok { id: "1".into() },
            PushTicket::Error {
                message: "gone".into(),
                code: not_registered(),
            },
        ]));

        let summary = dispatcher(&store, &provider, ChunkSizes::default())
            .dispatch(&notification())
            .await;

        assert_eq!(summary.tracked, vec![("1".to_string(), "A".to_string())]);
        assert_eq!(summary.removed, vec!["B"]);
        assert_eq!(store.tokens(), vec!["A"]);
        assert_eq!(provider.receipt_requests(), vec![vec!["1".to_string()]]);
    }

    #[tokio::test]
    async fn test_non_permanent_ticket_error_keeps_token() {
        let store = Arc::new(MemoryTokenStore::new(["A"]));
        let provider = Arc::new(MockPushProvider::new());
        provider.script_send(Ok(vec![PushTicket::Error {
            message: "slow down".into(),
            code: Some(PushErrorCode::MessageRateExceeded),
        }]));

        let summary = dispatcher(&store, &provider, ChunkSizes::default())
            .dispatch(&notification())
            .await;

        assert_eq!(summary.ticket_errors, 1);
        assert!(summary.removed.is_empty());
        assert!(provider.receipt_requests().is_empty());
    }

    #[tokio::test]
    async fn test_receipt_not_registered_removes_token() {
        let store = Arc::new(MemoryTokenStore::new(["A"]));
        let provider = Arc::new(MockPushProvider::new());
        provider.script_send(Ok(vec![PushTicket::Ok { id: "1".into() }]));
        provider.set_receipt(
            "1",
            PushReceipt::Error {
                message: "unregistered".into(),
                code: not_registered(),
            },
        );

        let summary = dispatcher(&store, &provider, ChunkSizes::default())
            .dispatch(&notification())
            .await;

        assert_eq!(summary.receipt_errors, 1);
        assert_eq!(summary.removed, vec!["A"]);
        assert!(store.tokens().is_empty());
    }

    #[tokio::test]
    async fn test_token_removed_once_per_dispatch() {
        // Duplicate registrations: the send-time error and the receipt error
        // both resolve to token "A".
        let store = Arc::new(MemoryTokenStore::new(["A", "A"]));
        let provider = Arc::new(MockPushProvider::new());
        provider.script_send(Ok(vec![
            PushTicket::Error {
                message: "gone".into(),
                code: not_registered(),
            },
            PushTicket::Ok { id: "2".into() },
        ]));
        provider.set_receipt(
            "2",
            PushReceipt::Error {
                message: "gone".into(),
                code: not_registered(),
            },
        );

        let summary = dispatcher(&store, &provider, ChunkSizes::default())
            .dispatch(&notification())
            .await;

        assert_eq!(summary.receipt_errors, 1);
        assert_eq!(summary.removed, vec!["A"]);
        assert_eq!(store.removed(), vec!["A"]);
    }

    #[tokio::test]
    async fn test_failed_chunk_keeps_later_chunks_aligned() {
        let store = Arc::new(MemoryTokenStore::new(["A", "B", "C", "D", "E"]));
        let provider = Arc::new(MockPushProvider::new());
        provider.script_send(Err(Error::Push("connection reset".into())));
        provider.script_send(Ok(vec![
            PushTicket::Ok { id: "c".into() },
            PushTicket::Ok { id: "d".into() },
        ]));
        provider.script_send(Ok(vec![PushTicket::Ok { id: "e".into() }]));

        let sizes = ChunkSizes {
            messages: 2,
            receipt_ids: 300,
        };
        let summary = dispatcher(&store, &provider, sizes)
            .dispatch(&notification())
            .await;

        assert_eq!(summary.failed_chunks, 1);
        assert_eq!(provider.sent_batches().len(), 3);
        assert_eq!(
            summary.tracked,
            vec![
                ("c".to_string(), "C".to_string()),
                ("d".to_string(), "D".to_string()),
                ("e".to_string(), "E".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_receipt_fetch_failure_skips_only_that_chunk() {
        let store = Arc::new(MemoryTokenStore::new(["A", "B"]));
        let provider = Arc::new(MockPushProvider::new());
        provider.script_send(Ok(vec![
            PushTicket::Ok { id: "1".into() },
            PushTicket::Ok { id: "2".into() },
        ]));
        provider.script_receipts(Err(Error::Push("timeout".into())));
        provider.set_receipt(
            "2",
            PushReceipt::Error {
                message: "gone".into(),
                code: not_registered(),
            },
        );

        let sizes = ChunkSizes {
            messages: 100,
            receipt_ids: 1,
        };
        let summary = dispatcher(&store, &provider, sizes)
            .dispatch(&notification())
            .await;

        assert_eq!(provider.receipt_requests().len(), 2);
        assert_eq!(summary.removed, vec!["B"]);
    }

    #[tokio::test]
    async fn test_empty_or_unavailable_store_sends_nothing() {
        let provider = Arc::new(MockPushProvider::new());

        let empty = Arc::new(MemoryTokenStore::default());
        let summary = dispatcher(&empty, &provider, ChunkSizes::default())
            .dispatch(&notification())
            .await;
        assert_eq!(summary, DispatchSummary::default());

        let down = Arc::new(MemoryTokenStore::unavailable());
        dispatcher(&down, &provider, ChunkSizes::default())
            .dispatch(&notification())
            .await;

        assert!(provider.sent_batches().is_empty());
    }

    #[tokio::test]
    async fn test_all_invalid_tokens_sends_nothing() {
        let store = Arc::new(MemoryTokenStore::new(["x", "y"]));
        let provider = Arc::new(MockPushProvider::new().with_invalid_tokens(["x", "y"]));
        let summary = dispatcher(&store, &provider, ChunkSizes::default())
            .dispatch(&notification())
            .await;

        assert!(summary.recipients.is_empty());
        assert!(provider.sent_batches().is_empty());
    }
}
