use std::sync::Arc;

use log::{error, info, warn};

use super::{ChangeFeedSource, CollectionWatcher, WatcherHandle};
use crate::errors::Result;
use crate::push::PushDispatcher;

/// Collections watched when none are configured.
pub const DEFAULT_COLLECTIONS: [&str; 2] = ["signals", "events"];

/// Starts one watcher per collection and closes them all on shutdown.
pub struct WatcherSupervisor {
    source: Arc<dyn ChangeFeedSource>,
    dispatcher: Arc<PushDispatcher>,
}

impl WatcherSupervisor {
    pub fn new(source: Arc<dyn ChangeFeedSource>, dispatcher: Arc<PushDispatcher>) -> Self {
        Self { source, dispatcher }
    }

    /// Starts watchers sequentially, in the given order.
    ///
    /// If any subscription fails, the watchers already started are closed and
    /// the error is returned.
    pub async fn start_all<S: AsRef<str>>(&self, collections: &[S]) -> Result<Vec<WatcherHandle>> {
        let mut handles = Vec::with_capacity(collections.len());
        for name in collections {
            let name = name.as_ref();
            match CollectionWatcher::start(name, self.source.as_ref(), self.dispatcher.clone()).await
            {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    error!("[watch] Failed to watch '{}': {}", name, e);
                    Self::stop_all(handles).await;
                    return Err(e);
                }
            }
        }
        info!("[watch] Started {} change stream watcher(s)", handles.len());
        Ok(handles)
    }

    /// Closes every handle. A failure on one does not stop the others.
    pub async fn stop_all(handles: Vec<WatcherHandle>) {
        for handle in handles {
            let collection = handle.collection().to_string();
            if let Err(e) = handle.close().await {
                warn!("[watch] Ignoring close failure for '{}': {}", collection, e);
            }
        }
    }
}
