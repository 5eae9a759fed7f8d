//! Per-collection change watcher.
//!
//! State machine: `Starting → Watching → Closed`. `Errored` is entered when
//! the feed reports an error and left again on the next delivered event; the
//! feed is never restarted here. Each qualifying event spawns its own
//! format-and-dispatch task, so the feed loop never waits on delivery.

use std::fmt;
use std::sync::Arc;

use futures::StreamExt;
use log::{debug, error, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{watched_operations, ChangeEvent, ChangeFeed, ChangeFeedSource};
use crate::errors::{Error, Result};
use crate::notifications::format_for_collection;
use crate::push::PushDispatcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    Starting,
    Watching,
    Errored,
    Closed,
}

impl fmt::Display for WatcherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Starting => "starting",
            Self::Watching => "watching",
            Self::Errored => "errored",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Watches one collection and forwards its changes as push notifications.
pub struct CollectionWatcher {
    collection: String,
    dispatcher: Arc<PushDispatcher>,
    state: watch::Sender<WatcherState>,
}

impl CollectionWatcher {
    /// Subscribes to `collection` and starts the feed loop.
    ///
    /// Fails if the subscription cannot be established.
    pub async fn start(
        collection: &str,
        source: &dyn ChangeFeedSource,
        dispatcher: Arc<PushDispatcher>,
    ) -> Result<WatcherHandle> {
        let (state_tx, state_rx) = watch::channel(WatcherState::Starting);
        let feed = source.open(collection, &watched_operations()).await?;
        info!("[watch] Watching '{}' for changes...", collection);
        state_tx.send_replace(WatcherState::Watching);

        let watcher = Self {
            collection: collection.to_string(),
            dispatcher,
            state: state_tx,
        };
        let cancel = CancellationToken::new();
        let task = tokio::spawn(watcher.run(feed, cancel.clone()));

        Ok(WatcherHandle {
            collection: collection.to_string(),
            state: state_rx,
            cancel,
            task,
        })
    }

    async fn run(self, mut feed: ChangeFeed, cancel: CancellationToken) {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("[watch] Closing change stream for '{}'", self.collection);
                    break;
                }
                next = feed.next() => match next {
                    Some(Ok(event)) => {
                        self.state.send_if_modified(|state| {
                            let recovered = *state == WatcherState::Errored;
                            if recovered {
                                *state = WatcherState::Watching;
                            }
                            recovered
                        });
                        self.handle_change(event);
                    }
                    Some(Err(e)) => {
                        error!("[watch] Change stream error on '{}': {}", self.collection, e);
                        self.state.send_replace(WatcherState::Errored);
                    }
                    None => {
                        warn!("[watch] Change stream closed for '{}'.", self.collection);
                        break;
                    }
                }
            }
        }
        drop(feed);
        self.state.send_replace(WatcherState::Closed);
    }

    /// Spawns formatting and delivery for one event; the task is not awaited.
    fn handle_change(&self, event: ChangeEvent) {
        if !event.operation.is_watched() {
            debug!(
                "[watch] Ignoring {} change on '{}'",
                event.operation, self.collection
            );
            return;
        }
        let Some(doc) = event.full_document else {
            warn!(
                "[watch] No full document for '{}' {} change, skipping",
                self.collection, event.operation
            );
            return;
        };

        let collection = self.collection.clone();
        let dispatcher = self.dispatcher.clone();
        tokio::spawn(async move {
            let notification = format_for_collection(&collection, &doc);
            dispatcher.dispatch(&notification).await;
        });
    }
}

/// Owner handle for a running watcher.
pub struct WatcherHandle {
    collection: String,
    state: watch::Receiver<WatcherState>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn state(&self) -> WatcherState {
        *self.state.borrow()
    }

    /// True until the feed has closed.
    pub fn is_active(&self) -> bool {
        self.state() != WatcherState::Closed
    }

    /// Resolves once the watcher reaches `Closed`.
    pub async fn closed(&mut self) {
        let _ = self
            .state
            .wait_for(|state| *state == WatcherState::Closed)
            .await;
    }

    /// Stops the feed loop and waits for it to exit.
    ///
    /// Dispatches already spawned keep running.
    pub async fn close(self) -> Result<()> {
        self.cancel.cancel();
        self.task.await.map_err(|e| {
            Error::ChangeFeed(format!(
                "watcher task for '{}' failed: {}",
                self.collection, e
            ))
        })
    }
}
