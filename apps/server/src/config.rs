use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use pushwatch_core::push::{ChunkSizes, DEFAULT_MESSAGE_CHUNK_SIZE, DEFAULT_RECEIPT_CHUNK_SIZE};
use pushwatch_core::watch::DEFAULT_COLLECTIONS;
use pushwatch_expo::{ExpoConfig, DEFAULT_BASE_URL};
use pushwatch_storage_mongo::{MongoConfig, TokenCollections};
use thiserror::Error;

const DEFAULT_HEALTH_PORT: u16 = 3099;
const EXPO_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mongo: MongoConfig,
    pub watch_collections: Vec<String>,
    pub token_collections: TokenCollections,
    pub expo: ExpoConfig,
    pub chunk_sizes: ChunkSizes,
    pub listen_addr: SocketAddr,
}

impl Config {
    /// Reads the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let mongo = MongoConfig {
            uri: required("MONGO_URI")?,
            database: required("MONGO_DB_NAME")?,
        };

        let watch_collections = match get("PW_WATCH_COLLECTIONS") {
            Some(list) => parse_list(&list),
            None => DEFAULT_COLLECTIONS.iter().map(|c| c.to_string()).collect(),
        };
        if watch_collections.is_empty() {
            return Err(ConfigError::Invalid {
                name: "PW_WATCH_COLLECTIONS",
                reason: "no collection names given".to_string(),
            });
        }

        let defaults = TokenCollections::default();
        let token_collections = TokenCollections {
            read: get("PW_TOKEN_READ_COLLECTION").unwrap_or(defaults.read),
            delete: get("PW_TOKEN_DELETE_COLLECTION").unwrap_or(defaults.delete),
            field: get("PW_TOKEN_FIELD").unwrap_or(defaults.field),
        };

        let expo = ExpoConfig {
            base_url: get("EXPO_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            access_token: get("EXPO_ACCESS_TOKEN"),
            timeout: EXPO_TIMEOUT,
        };

        let chunk_sizes = ChunkSizes {
            messages: parse_bounded(
                "PW_PUSH_CHUNK_SIZE",
                get("PW_PUSH_CHUNK_SIZE"),
                DEFAULT_MESSAGE_CHUNK_SIZE,
                DEFAULT_MESSAGE_CHUNK_SIZE,
            )?,
            receipt_ids: parse_bounded(
                "PW_RECEIPT_CHUNK_SIZE",
                get("PW_RECEIPT_CHUNK_SIZE"),
                DEFAULT_RECEIPT_CHUNK_SIZE,
                DEFAULT_RECEIPT_CHUNK_SIZE,
            )?,
        };

        let port = match get("HEALTH_PORT") {
            Some(raw) => parse_number::<u16>("HEALTH_PORT", &raw)?,
            None => DEFAULT_HEALTH_PORT,
        };

        Ok(Self {
            mongo,
            watch_collections,
            token_collections,
            expo,
            chunk_sizes,
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
        })
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_number<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::Invalid {
        name,
        reason: format!("'{}': {}", raw, e),
    })
}

/// Batch sizes must stay within what the gateway accepts per request.
fn parse_bounded(
    name: &'static str,
    raw: Option<String>,
    default: usize,
    max: usize,
) -> Result<usize, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let value = parse_number::<usize>(name, &raw)?;
    if value == 0 || value > max {
        return Err(ConfigError::Invalid {
            name,
            reason: format!("{} is outside 1..={}", value, max),
        });
    }
    Ok(value)
}
