//! Push token repository implementation.

use async_trait::async_trait;
use futures::TryStreamExt;
use log::{debug, info};
use mongodb::bson::{doc, Bson, Document};
use mongodb::{Collection, Database};

use pushwatch_core::tokens::TokenStoreTrait;
use pushwatch_core::Result;

use crate::errors::IntoCore;

/// Where tokens are read from and deleted from.
///
/// The registration flow writes to one collection while pruning has
/// historically targeted another; both names are configurable and may be
/// equal.
#[derive(Debug, Clone)]
pub struct TokenCollections {
    pub read: String,
    pub delete: String,
    pub field: String,
}

impl Default for TokenCollections {
    fn default() -> Self {
        Self {
            read: "expo_push_tokens".to_string(),
            delete: "user_push_tokens".to_string(),
            field: "token".to_string(),
        }
    }
}

pub struct MongoTokenRepository {
    read: Collection<Document>,
    delete: Collection<Document>,
    field: String,
}

impl MongoTokenRepository {
    pub fn new(db: &Database, collections: TokenCollections) -> Self {
        Self {
            read: db.collection(&collections.read),
            delete: db.collection(&collections.delete),
            field: collections.field,
        }
    }
}

/// Token value of a stored record, if it holds a non-empty string.
pub(crate) fn token_from_document(doc: &Document, field: &str) -> Option<String> {
    match doc.get(field) {
        Some(Bson::String(token)) if !token.is_empty() => Some(token.clone()),
        _ => None,
    }
}

#[async_trait]
impl TokenStoreTrait for MongoTokenRepository {
    async fn list_tokens(&self) -> Result<Vec<String>> {
        let records: Vec<Document> = self
            .read
            .find(doc! {})
            .projection(doc! { &self.field: 1, "_id": 0 })
            .await
            .into_core()?
            .try_collect()
            .await
            .into_core()?;

        let tokens: Vec<String> = records
            .iter()
            .filter_map(|record| token_from_document(record, &self.field))
            .collect();
        debug!(
            "[mongo] Loaded {} token(s) from '{}' ({} record(s))",
            tokens.len(),
            self.read.name(),
            records.len()
        );
        Ok(tokens)
    }

    async fn remove_token(&self, token: &str) -> Result<u64> {
        let result = self
            .delete
            .delete_many(doc! { &self.field: token })
            .await
            .into_core()?;
        info!(
            "[mongo] Removed {} record(s) for token {} from '{}'",
            result.deleted_count,
            token,
            self.delete.name()
        );
        Ok(result.deleted_count)
    }
}
