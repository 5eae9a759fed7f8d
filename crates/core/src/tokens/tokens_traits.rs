use crate::errors::Result;
use async_trait::async_trait;

/// Trait for reading and pruning stored device push tokens.
///
/// Reads and deletes may target different underlying collections; the
/// implementation decides where each goes.
#[async_trait]
pub trait TokenStoreTrait: Send + Sync {
    /// Returns every token on file, skipping records without a token value.
    async fn list_tokens(&self) -> Result<Vec<String>>;

    /// Deletes all records whose token equals `token` exactly.
    ///
    /// Returns the number of records removed.
    async fn remove_token(&self, token: &str) -> Result<u64>;
}
