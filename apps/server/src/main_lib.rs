use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use pushwatch_core::health::ConnectivityProbe;
use pushwatch_core::push::PushDispatcher;
use pushwatch_core::tokens::TokenStoreTrait;
use pushwatch_core::watch::{ChangeFeedSource, WatcherHandle, WatcherSupervisor};
use pushwatch_expo::ExpoPushClient;
use pushwatch_storage_mongo::{MongoChangeFeedSource, MongoStore, MongoTokenRepository};

use crate::config::Config;

/// Shared state behind the liveness router.
pub struct AppState {
    pub started_at: Instant,
    pub database: Arc<dyn ConnectivityProbe>,
    pub watchers: Mutex<Vec<WatcherHandle>>,
}

impl AppState {
    pub fn new(database: Arc<dyn ConnectivityProbe>, watchers: Vec<WatcherHandle>) -> Self {
        Self {
            started_at: Instant::now(),
            database,
            watchers: Mutex::new(watchers),
        }
    }

    /// Watchers whose feed has not closed.
    pub async fn active_watchers(&self) -> usize {
        self.watchers
            .lock()
            .await
            .iter()
            .filter(|h| h.is_active())
            .count()
    }

    /// Takes ownership of every watcher handle, leaving none behind.
    pub async fn take_watchers(&self) -> Vec<WatcherHandle> {
        std::mem::take(&mut *self.watchers.lock().await)
    }
}

/// Everything the process owns between boot and shutdown.
pub struct Runtime {
    pub state: Arc<AppState>,
    pub store: Arc<MongoStore>,
}

impl Runtime {
    /// Stops the watchers, then closes the database connection.
    ///
    /// Dispatches already in flight are not awaited.
    pub async fn shutdown(self) {
        let handles = self.state.take_watchers().await;
        tracing::info!("Closing {} watcher(s)", handles.len());
        WatcherSupervisor::stop_all(handles).await;
        self.store.disconnect().await;
    }
}

pub fn init_tracing() {
    let log_format = std::env::var("PW_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Connects to MongoDB, wires the dispatcher and starts every watcher.
///
/// Any failure after the connection is up disconnects before returning.
pub async fn build_runtime(config: &Config) -> anyhow::Result<Runtime> {
    let store = Arc::new(MongoStore::connect(&config.mongo).await?);
    let db = store.database();

    let token_store = Arc::new(MongoTokenRepository::new(
        &db,
        config.token_collections.clone(),
    ));
    let source = Arc::new(MongoChangeFeedSource::new(db));
    let started = start_pipeline(config, token_store, source).await;
    let watchers = release_on_failure(started, || store.disconnect()).await?;

    let state = Arc::new(AppState::new(store.clone(), watchers));
    Ok(Runtime { state, store })
}

/// Builds the push client and dispatcher, then starts one watcher per
/// configured collection.
pub async fn start_pipeline(
    config: &Config,
    token_store: Arc<dyn TokenStoreTrait>,
    source: Arc<dyn ChangeFeedSource>,
) -> anyhow::Result<Vec<WatcherHandle>> {
    let provider = Arc::new(ExpoPushClient::new(config.expo.clone())?);
    let dispatcher = Arc::new(
        PushDispatcher::new(token_store, provider).with_chunk_sizes(config.chunk_sizes),
    );
    tracing::info!(
        "Push dispatcher ready (read tokens from '{}', prune from '{}')",
        config.token_collections.read,
        config.token_collections.delete
    );

    let supervisor = WatcherSupervisor::new(source, dispatcher);
    Ok(supervisor
        .start_all(config.watch_collections.as_slice())
        .await?)
}

/// Runs `cleanup` when `result` is an error, then hands the result back.
pub(crate) async fn release_on_failure<T, F, Fut>(
    result: anyhow::Result<T>,
    cleanup: F,
) -> anyhow::Result<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = ()>,
{
    if result.is_err() {
        cleanup().await;
    }
    result
}
