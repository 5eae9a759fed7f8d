//! Pushwatch Core - Domain types, services, and traits.
//!
//! This crate turns database change events into push notifications. It is
//! storage- and provider-agnostic: it defines the traits that the
//! `storage-mongo` and `expo-push` crates implement.
//!
//! ```text
//! ChangeFeedSource ─▶ CollectionWatcher ─▶ format_for_collection
//!                                               │
//!                    TokenStoreTrait ◀──▶ PushDispatcher ◀──▶ PushProvider
//! ```

pub mod errors;
pub mod health;
pub mod notifications;
pub mod push;
pub mod tokens;
pub mod watch;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
