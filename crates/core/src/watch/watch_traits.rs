use async_trait::async_trait;
use futures::stream::BoxStream;

use super::{ChangeEvent, OperationType};
use crate::errors::Result;

/// Live stream of change events for one collection.
///
/// Yields `Err` for feed-level errors; the stream ending means the feed closed.
pub type ChangeFeed = BoxStream<'static, Result<ChangeEvent>>;

/// Trait for subscribing to a collection's change feed.
#[async_trait]
pub trait ChangeFeedSource: Send + Sync {
    /// Opens a feed admitting only `operations`, with the full post-change
    /// document resolved on every event.
    ///
    /// Fails when the subscription itself cannot be established.
    async fn open(&self, collection: &str, operations: &[OperationType]) -> Result<ChangeFeed>;
}
