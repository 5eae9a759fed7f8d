use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use futures::channel::mpsc;
use futures::StreamExt;

use super::{ChangeEvent, ChangeFeed, ChangeFeedSource, OperationType};
use crate::errors::{Error, Result};

/// Channel-backed change feed source for tests.
///
/// Every `open` creates a channel; tests push events through `sender` and
/// close the feed by dropping the sender.
#[derive(Default)]
pub struct MockChangeFeedSource {
    senders: Mutex<HashMap<String, mpsc::UnboundedSender<Result<ChangeEvent>>>>,
    opened: Mutex<Vec<(String, Vec<OperationType>)>>,
    failing: HashSet<String>,
}

impl MockChangeFeedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collections whose subscription fails.
    pub fn failing_on<I, S>(mut self, collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.failing = collections.into_iter().map(Into::into).collect();
        self
    }

    /// Sender feeding the open subscription for `collection`.
    pub fn sender(&self, collection: &str) -> Option<mpsc::UnboundedSender<Result<ChangeEvent>>> {
        self.senders.lock().unwrap().get(collection).cloned()
    }

    /// Closes the feed for `collection` from the provider side.
    pub fn close(&self, collection: &str) {
        self.senders.lock().unwrap().remove(collection);
    }

    /// Subscriptions opened so far, with the operation filter each requested.
    pub fn opened(&self) -> Vec<(String, Vec<OperationType>)> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChangeFeedSource for MockChangeFeedSource {
    async fn open(&self, collection: &str, operations: &[OperationType]) -> Result<ChangeFeed> {
        if self.failing.contains(collection) {
            return Err(Error::ChangeFeed(format!(
                "cannot open change stream on '{}'",
                collection
            )));
        }
        let (tx, rx) = mpsc::unbounded();
        self.senders
            .lock()
            .unwrap()
            .insert(collection.to_string(), tx);
        self.opened
            .lock()
            .unwrap()
            .push((collection.to_string(), operations.to_vec()));
        Ok(rx.boxed())
    }
}
