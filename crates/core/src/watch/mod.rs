//! Change watching: feed events, the per-collection watcher and its supervisor.

mod change_event;
mod mock_feed;
mod supervisor;
mod watch_traits;
mod watcher;

pub use change_event::{watched_operations, ChangeEvent, OperationType};
pub use mock_feed::MockChangeFeedSource;
pub use supervisor::{WatcherSupervisor, DEFAULT_COLLECTIONS};
pub use watch_traits::{ChangeFeed, ChangeFeedSource};
pub use watcher::{CollectionWatcher, WatcherHandle, WatcherState};
