use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{PushMessage, PushProvider, PushReceipt, PushTicket};
use crate::errors::Result;

/// Scriptable push provider for tests - records every request.
///
/// Send and receipt responses are taken from their script queues first; once a
/// queue is empty, sends return `ok` tickets with generated ids (`ticket-N`)
/// and receipt fetches answer from the receipts set with `set_receipt`,
/// defaulting to `ok`.
#[derive(Default)]
pub struct MockPushProvider {
    invalid_tokens: HashSet<String>,
    send_script: Mutex<VecDeque<Result<Vec<PushTicket>>>>,
    receipt_script: Mutex<VecDeque<Result<HashMap<String, PushReceipt>>>>,
    receipts: Mutex<HashMap<String, PushReceipt>>,
    sent: Mutex<Vec<Vec<PushMessage>>>,
    receipt_requests: Mutex<Vec<Vec<String>>>,
    next_ticket: AtomicUsize,
    listener: Mutex<Option<mpsc::UnboundedSender<Vec<PushMessage>>>>,
}

impl MockPushProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens that fail the format check.
    pub fn with_invalid_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.invalid_tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// Queues the response for the next send request.
    pub fn script_send(&self, response: Result<Vec<PushTicket>>) {
        self.send_script.lock().unwrap().push_back(response);
    }

    /// Queues the response for the next receipt request.
    pub fn script_receipts(&self, response: Result<HashMap<String, PushReceipt>>) {
        self.receipt_script.lock().unwrap().push_back(response);
    }

    pub fn set_receipt(&self, ticket_id: &str, receipt: PushReceipt) {
        self.receipts
            .lock()
            .unwrap()
            .insert(ticket_id.to_string(), receipt);
    }

    /// Streams every sent chunk as it is submitted.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Vec<PushMessage>> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.listener.lock().unwrap() = Some(tx);
        rx
    }

    pub fn sent_batches(&self) -> Vec<Vec<PushMessage>> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_messages(&self) -> Vec<PushMessage> {
        self.sent_batches().into_iter().flatten().collect()
    }

    pub fn receipt_requests(&self) -> Vec<Vec<String>> {
        self.receipt_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushProvider for MockPushProvider {
    fn is_valid_token(&self, token: &str) -> bool {
        !self.invalid_tokens.contains(token)
    }

    async fn send(&self, messages: &[PushMessage]) -> Result<Vec<PushTicket>> {
        self.sent.lock().unwrap().push(messages.to_vec());
        if let Some(tx) = self.listener.lock().unwrap().as_ref() {
            let _ = tx.send(messages.to_vec());
        }

        if let Some(scripted) = self.send_script.lock().unwrap().pop_front() {
            return scripted;
        }
        Ok(messages
            .iter()
            .map(|_| PushTicket::Ok {
                id: format!("ticket-{}", self.next_ticket.fetch_add(1, Ordering::SeqCst)),
            })
            .collect())
    }

    async fn fetch_receipts(&self, ticket_ids: &[String]) -> Result<HashMap<String, PushReceipt>> {
        self.receipt_requests
            .lock()
            .unwrap()
            .push(ticket_ids.to_vec());

        if let Some(scripted) = self.receipt_script.lock().unwrap().pop_front() {
            return scripted;
        }
        let receipts = self.receipts.lock().unwrap();
        Ok(ticket_ids
            .iter()
            .map(|id| {
                let receipt = receipts.get(id).cloned().unwrap_or(PushReceipt::Ok);
                (id.clone(), receipt)
            })
            .collect())
    }
}
