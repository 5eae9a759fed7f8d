//! Device push tokens - the store trait and an in-memory implementation.

mod memory_store;
mod tokens_traits;

pub use memory_store::MemoryTokenStore;
pub use tokens_traits::TokenStoreTrait;
