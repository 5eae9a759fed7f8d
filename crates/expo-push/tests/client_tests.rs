//! Client tests against a local stub of the Expo gateway.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use pushwatch_core::push::{PushErrorCode, PushProvider, PushReceipt, PushTicket};
use pushwatch_expo::{ExpoConfig, ExpoError, ExpoPushClient, ExpoPushMessage, ExpoPushTicket};

#[derive(Clone, Default)]
struct Recorded {
    bodies: Arc<Mutex<Vec<Value>>>,
    auth: Arc<Mutex<Vec<Option<String>>>>,
}

impl Recorded {
    fn record(&self, headers: &HeaderMap, body: Value) {
        self.bodies.lock().unwrap().push(body);
        self.auth.lock().unwrap().push(
            headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        );
    }
}

async fn send_handler(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    recorded.record(&headers, body.clone());
    let messages = body.as_array().cloned().unwrap_or_default();
    if messages.iter().any(|m| m["to"] == "ExponentPushToken[toobig]") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "errors": [{ "code": "PUSH_TOO_MANY_EXPERIENCE_IDS", "message": "mixed projects" }]
            })),
        );
    }

    let tickets: Vec<Value> = messages
        .iter()
        .enumerate()
        .map(|(i, m)| {
            if m["to"] == "ExponentPushToken[gone]" {
                json!({
                    "status": "error",
                    "message": "not registered",
                    "details": { "error": "DeviceNotRegistered" }
                })
            } else {
                json!({ "status": "ok", "id": format!("id-{}", i) })
            }
        })
        .collect();
    (StatusCode::OK, Json(json!({ "data": tickets })))
}

async fn receipts_handler(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    recorded.record(&headers, body.clone());
    let mut data = serde_json::Map::new();
    for id in body["ids"].as_array().cloned().unwrap_or_default() {
        let id = id.as_str().unwrap_or_default().to_string();
        let receipt = if id == "id-1" {
            json!({ "status": "error", "message": "gone", "details": { "error": "DeviceNotRegistered" } })
        } else if id == "pending" {
            continue;
        } else {
            json!({ "status": "ok" })
        };
        data.insert(id, receipt);
    }
    Json(json!({ "data": data }))
}

async fn spawn_gateway() -> (String, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/--/api/v2/push/send", post(send_handler))
        .route("/--/api/v2/push/getReceipts", post(receipts_handler))
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), recorded)
}

fn client(base_url: &str, access_token: Option<&str>) -> ExpoPushClient {
    ExpoPushClient::new(ExpoConfig {
        base_url: base_url.to_string(),
        access_token: access_token.map(str::to_string),
        ..ExpoConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_send_returns_tickets_in_request_order() {
    let (url, recorded) = spawn_gateway().await;
    let client = client(&url, None);

    let mut first = ExpoPushMessage::new("ExponentPushToken[a]");
    first.title = Some("BUY".into());
    let second = ExpoPushMessage::new("ExponentPushToken[gone]");

    let tickets = client
        .send_push_notifications(&[first, second])
        .await
        .unwrap();

    assert_eq!(tickets.len(), 2);
    assert_eq!(tickets[0], ExpoPushTicket::Ok { id: "id-0".into() });
    assert!(matches!(tickets[1], ExpoPushTicket::Error { .. }));

    let bodies = recorded.bodies.lock().unwrap();
    assert_eq!(bodies[0][0]["title"], "BUY");
    assert_eq!(recorded.auth.lock().unwrap()[0], None);
}

#[tokio::test]
async fn test_access_token_is_sent_as_bearer() {
    let (url, recorded) = spawn_gateway().await;
    let client = client(&url, Some("s3cret"));

    client
        .send_push_notifications(&[ExpoPushMessage::new("ExponentPushToken[a]")])
        .await
        .unwrap();
    client
        .get_push_notification_receipts(&["id-0".to_string()])
        .await
        .unwrap();

    let auth = recorded.auth.lock().unwrap();
    assert_eq!(auth.len(), 2);
    assert!(auth.iter().all(|a| a.as_deref() == Some("Bearer s3cret")));
}

#[tokio::test]
async fn test_request_level_errors_fail_the_batch() {
    let (url, _recorded) = spawn_gateway().await;
    let client = client(&url, None);

    let err = client
        .send_push_notifications(&[ExpoPushMessage::new("ExponentPushToken[toobig]")])
        .await
        .unwrap_err();

    match err {
        ExpoError::Api { status, message } => {
            assert_eq!(status, 400);
            assert!(message.contains("PUSH_TOO_MANY_EXPERIENCE_IDS"));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn test_receipts_omit_pending_ids() {
    let (url, recorded) = spawn_gateway().await;
    let client = client(&url, None);

    let ids = vec!["id-0".to_string(), "id-1".to_string(), "pending".to_string()];
    let receipts = client.get_push_notification_receipts(&ids).await.unwrap();

    assert_eq!(receipts.len(), 2);
    assert!(!receipts.contains_key("pending"));
    assert_eq!(
        recorded.bodies.lock().unwrap()[0],
        json!({ "ids": ["id-0", "id-1", "pending"] })
    );
}

#[tokio::test]
async fn test_provider_round_trip_maps_error_codes() {
    let (url, _recorded) = spawn_gateway().await;
    let client = client(&url, None);
    let notification = pushwatch_core::notifications::Notification::new(
        "BUY",
        "BUY AAPL @ 10",
        json!({ "type": "signal" }),
    );
    let messages = vec![
        pushwatch_core::push::PushMessage::for_token("ExponentPushToken[a]", &notification),
        pushwatch_core::push::PushMessage::for_token("ExponentPushToken[gone]", &notification),
    ];

    let tickets = PushProvider::send(&client, &messages).await.unwrap();
    assert_eq!(tickets[0], PushTicket::Ok { id: "id-0".into() });
    assert_eq!(
        tickets[1],
        PushTicket::Error {
            message: "not registered".into(),
            code: Some(PushErrorCode::DeviceNotRegistered),
        }
    );

    let receipts: HashMap<String, PushReceipt> = client
        .fetch_receipts(&["id-0".to_string(), "id-1".to_string()])
        .await
        .unwrap();
    assert_eq!(receipts["id-0"], PushReceipt::Ok);
    assert!(matches!(
        &receipts["id-1"],
        PushReceipt::Error { code: Some(code), .. } if code.is_permanent()
    ));
}

#[tokio::test]
async fn test_unreachable_gateway_surfaces_as_push_error() {
    let client = client("http://127.0.0.1:9", None);
    let err = client
        .send(&[pushwatch_core::push::PushMessage::for_token(
            "ExponentPushToken[a]",
            &pushwatch_core::notifications::Notification::new("t", "b", json!({})),
        )])
        .await
        .unwrap_err();
    assert!(matches!(err, pushwatch_core::Error::Push(_)));
}
