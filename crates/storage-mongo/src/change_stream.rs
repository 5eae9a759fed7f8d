//! Change feed source backed by MongoDB change streams.
//!
//! Change streams require a replica set or sharded cluster; opening one
//! against a standalone server fails at subscription time.

use async_trait::async_trait;
use futures::StreamExt;
use log::debug;
use mongodb::bson::{doc, Bson, Document};
use mongodb::change_stream::event::{ChangeStreamEvent, OperationType as MongoOperationType};
use mongodb::options::FullDocumentType;
use mongodb::Database;
use serde_json::Value;

use pushwatch_core::watch::{ChangeEvent, ChangeFeed, ChangeFeedSource, OperationType};
use pushwatch_core::Result;

use crate::errors::StorageError;

pub struct MongoChangeFeedSource {
    db: Database,
}

impl MongoChangeFeedSource {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

/// `$match` stage restricting the stream to the given operation types.
pub(crate) fn operation_filter(operations: &[OperationType]) -> Vec<Document> {
    let names: Vec<String> = operations.iter().map(|op| op.as_str().to_string()).collect();
    vec![doc! { "$match": { "operationType": { "$in": names } } }]
}

pub(crate) fn convert_operation(op: &MongoOperationType) -> OperationType {
    match op {
        MongoOperationType::Insert => OperationType::Insert,
        MongoOperationType::Update => OperationType::Update,
        MongoOperationType::Replace => OperationType::Replace,
        MongoOperationType::Delete => OperationType::Delete,
        MongoOperationType::Drop => OperationType::Other("drop".to_string()),
        MongoOperationType::Rename => OperationType::Other("rename".to_string()),
        MongoOperationType::DropDatabase => OperationType::Other("dropDatabase".to_string()),
        MongoOperationType::Invalidate => OperationType::Other("invalidate".to_string()),
        other => OperationType::Other(format!("{:?}", other)),
    }
}

/// Relaxed extended JSON keeps dates as `{"$date": ...}` and decimals as
/// `{"$numberDecimal": ...}`, which the field renderer understands.
pub(crate) fn document_to_json(doc: Document) -> Value {
    Bson::Document(doc).into_relaxed_extjson()
}

pub(crate) fn convert_event(collection: &str, event: ChangeStreamEvent<Document>) -> ChangeEvent {
    ChangeEvent::new(
        collection,
        convert_operation(&event.operation_type),
        event.full_document.map(document_to_json),
    )
}

#[async_trait]
impl ChangeFeedSource for MongoChangeFeedSource {
    async fn open(&self, collection: &str, operations: &[OperationType]) -> Result<ChangeFeed> {
        let stream = self
            .db
            .collection::<Document>(collection)
            .watch()
            .pipeline(operation_filter(operations))
            .full_document(FullDocumentType::UpdateLookup)
            .await
            .map_err(StorageError::ChangeStream)?;
        debug!("[mongo] Opened change stream on '{}'", collection);

        let name = collection.to_string();
        let feed = stream.map(move |next| match next {
            Ok(event) => Ok(convert_event(&name, event)),
            Err(e) => Err(StorageError::ChangeStream(e).into()),
        });
        Ok(feed.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pushwatch_core::watch::watched_operations;
    use serde_json::json;

    #[test]
    fn test_operation_filter_lists_requested_types() {
        let pipeline = operation_filter(&watched_operations());
        assert_eq!(pipeline.len(), 1);
        assert_eq!(
            pipeline[0],
            doc! { "$match": { "operationType": { "$in": ["insert", "update", "replace"] } } }
        );
    }

    #[test]
    fn test_operation_conversion() {
        assert_eq!(convert_operation(&MongoOperationType::Insert), OperationType::Insert);
        assert_eq!(convert_operation(&MongoOperationType::Replace), OperationType::Replace);
        assert_eq!(
            convert_operation(&MongoOperationType::Invalidate),
            OperationType::Other("invalidate".into())
        );
        assert!(!convert_operation(&MongoOperationType::Delete).is_watched());
    }

    #[test]
    fn test_document_to_json_keeps_extended_types() {
        let value = document_to_json(doc! {
            "ticker": "AAPL",
            "price": 187.5,
            "volume": 1_000_i64,
            "ts": mongodb::bson::DateTime::from_millis(1_709_303_400_000),
        });
        assert_eq!(value["ticker"], json!("AAPL"));
        assert_eq!(value["price"], json!(187.5));
        assert_eq!(value["volume"], json!(1000));
        assert!(value["ts"]["$date"]
            .as_str()
            .is_some_and(|d| d.starts_with("2024-03-01T14:30:00")));
    }
}
