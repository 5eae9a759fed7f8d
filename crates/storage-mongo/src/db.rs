//! MongoDB connection handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};

use pushwatch_core::health::ConnectivityProbe;
use pushwatch_core::Result;

use crate::errors::{IntoCore, StorageError};

const MAX_POOL_SIZE: u32 = 10;
const MIN_POOL_SIZE: u32 = 1;
const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(10);
const APP_NAME: &str = "pushwatch";

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

/// Process-wide MongoDB handle.
///
/// Created once at boot and shared by the token repository, the change feed
/// source and the liveness endpoint.
pub struct MongoStore {
    client: Client,
    database: Database,
    connected: AtomicBool,
}

impl MongoStore {
    /// Builds the client and verifies the server answers a `ping`.
    pub async fn connect(config: &MongoConfig) -> Result<Self> {
        let mut options = ClientOptions::parse(&config.uri)
            .await
            .map_err(StorageError::ConnectionFailed)?;
        options.max_pool_size = Some(MAX_POOL_SIZE);
        options.min_pool_size = Some(MIN_POOL_SIZE);
        options.retry_writes = Some(true);
        options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);
        options.app_name = Some(APP_NAME.to_string());

        let client = Client::with_options(options).map_err(StorageError::ConnectionFailed)?;
        let database = client.database(&config.database);
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(StorageError::ConnectionFailed)?;
        info!("[mongo] Connected to database '{}'", config.database);

        Ok(Self {
            client,
            database,
            connected: AtomicBool::new(true),
        })
    }

    /// Cloned handle to the configured database.
    pub fn database(&self) -> Database {
        self.database.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Closes the connection pool. Later pings fail with `NotConnected`.
    pub async fn disconnect(&self) {
        if !self.connected.swap(false, Ordering::SeqCst) {
            warn!("[mongo] disconnect called twice");
            return;
        }
        self.client.clone().shutdown().immediate(true).await;
        info!("[mongo] Disconnected");
    }
}

#[async_trait]
impl ConnectivityProbe for MongoStore {
    async fn ping(&self) -> Result<()> {
        if !self.is_connected() {
            return Err(StorageError::Disconnected.into());
        }
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .into_core()
    }
}
