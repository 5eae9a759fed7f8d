//! MongoDB storage implementation for pushwatch.
//!
//! This crate is the only place in the workspace where the MongoDB driver is
//! used. It implements the traits defined in `pushwatch-core`:
//! - `TokenStoreTrait` over the push token collections
//! - `ChangeFeedSource` over collection change streams
//! - `ConnectivityProbe` for the liveness endpoint
//!
//! ```text
//!        core (domain)
//!              │
//!              ▼
//!   storage-mongo (this crate)
//!              │
//!              ▼
//!       MongoDB replica set
//! ```

pub mod change_stream;
pub mod db;
pub mod errors;
pub mod tokens;

pub use change_stream::MongoChangeFeedSource;
pub use db::{MongoConfig, MongoStore};
pub use errors::{IntoCore, StorageError};
pub use tokens::{MongoTokenRepository, TokenCollections};

// Re-export from pushwatch-core for convenience
pub use pushwatch_core::errors::{DatabaseError, Error, Result};
