//! Runs against a live replica set when `PW_TEST_MONGO_URI` is set.
//!
//! ```sh
//! PW_TEST_MONGO_URI=mongodb://localhost:27017/?replicaSet=rs0 cargo test -p pushwatch-storage-mongo
//! ```

use std::time::Duration;

use futures::StreamExt;
use mongodb::bson::doc;
use pushwatch_core::health::ConnectivityProbe;
use pushwatch_core::tokens::TokenStoreTrait;
use pushwatch_core::watch::{watched_operations, ChangeFeedSource, OperationType};
use pushwatch_storage_mongo::{
    MongoChangeFeedSource, MongoConfig, MongoStore, MongoTokenRepository, TokenCollections,
};

async fn connect() -> Option<MongoStore> {
    let uri = std::env::var("PW_TEST_MONGO_URI").ok()?;
    let config = MongoConfig {
        uri,
        database: format!("pushwatch_test_{}", std::process::id()),
    };
    Some(MongoStore::connect(&config).await.unwrap())
}

#[tokio::test]
async fn test_token_repository_round_trip() {
    let Some(store) = connect().await else {
        return;
    };
    let db = store.database();
    let collections = TokenCollections {
        read: "tokens".into(),
        delete: "tokens".into(),
        field: "token".into(),
    };
    let coll = db.collection::<mongodb::bson::Document>("tokens");
    coll.insert_many(vec![
        doc! { "token": "ExponentPushToken[a]" },
        doc! { "token": "" },
        doc! { "userId": 1 },
        doc! { "token": "ExponentPushToken[b]" },
        doc! { "token": "ExponentPushToken[b]" },
    ])
    .await
    .unwrap();

    let repo = MongoTokenRepository::new(&db, collections);
    assert_eq!(
        repo.list_tokens().await.unwrap(),
        vec![
            "ExponentPushToken[a]",
            "ExponentPushToken[b]",
            "ExponentPushToken[b]"
        ]
    );
    assert_eq!(repo.remove_token("ExponentPushToken[b]").await.unwrap(), 2);
    assert_eq!(repo.remove_token("ExponentPushToken[zz]").await.unwrap(), 0);

    db.drop().await.unwrap();
    store.disconnect().await;
    assert!(store.ping().await.is_err());
}

#[tokio::test]
async fn test_change_stream_delivers_full_documents() {
    let Some(store) = connect().await else {
        return;
    };
    let db = store.database();
    let source = MongoChangeFeedSource::new(db.clone());
    let mut feed = source.open("signals", &watched_operations()).await.unwrap();

    let coll = db.collection::<mongodb::bson::Document>("signals");
    coll.insert_one(doc! { "action": "BUY", "ticker": "AAPL" })
        .await
        .unwrap();

    let event = tokio::time::timeout(Duration::from_secs(10), feed.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(event.operation, OperationType::Insert);
    assert_eq!(event.full_document.unwrap()["ticker"], "AAPL");

    drop(feed);
    db.drop().await.unwrap();
    store.disconnect().await;
}
