//! Expo push API client.
//!
//! Talks to the two gateway endpoints used by the pipeline: send and
//! getReceipts. Request size limits are enforced here so an oversized batch
//! fails before it reaches the network.

use std::collections::HashMap;
use std::time::Duration;

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};

use crate::error::{ExpoError, Result};
use crate::types::*;

/// Production gateway.
pub const DEFAULT_BASE_URL: &str = "https://exp.host";

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum messages per send request.
pub(crate) const PUSH_NOTIFICATION_CHUNK_LIMIT: usize = 100;

/// Maximum ticket ids per receipt request.
pub(crate) const PUSH_NOTIFICATION_RECEIPT_CHUNK_LIMIT: usize = 300;

/// Connection settings for the gateway.
#[derive(Debug, Clone)]
pub struct ExpoConfig {
    pub base_url: String,
    /// Enhanced push security access token, sent as a bearer token when set.
    pub access_token: Option<String>,
    pub timeout: Duration,
}

impl Default for ExpoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Client for the Expo push API.
#[derive(Debug, Clone)]
pub struct ExpoPushClient {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl ExpoPushClient {
    pub fn new(config: ExpoConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.filter(|t| !t.is_empty()),
        })
    }

    /// Create headers for an API request.
    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.access_token {
            let auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ExpoError::auth("Invalid access token format"))?;
            headers.insert(AUTHORIZATION, auth_value);
        }

        Ok(headers)
    }

    /// Parse a response envelope and return its `data`.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        debug!("[expo] API response ({}): {}", status, body);

        let envelope = match serde_json::from_str::<ApiResponse<T>>(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                log::error!(
                    "[expo] Failed to deserialize response. Body: {}, Error: {}",
                    body,
                    e
                );
                return Err(ExpoError::api(
                    status.as_u16(),
                    format!("Failed to parse response: {}", e),
                ));
            }
            Err(_) => {
                return Err(ExpoError::api(
                    status.as_u16(),
                    format!("Request failed: {}", body),
                ));
            }
        };

        if let Some(errors) = envelope.errors.filter(|e| !e.is_empty()) {
            let message = errors
                .iter()
                .map(|e| format!("{}: {}", e.code, e.message))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(ExpoError::api(status.as_u16(), message));
        }
        if !status.is_success() {
            return Err(ExpoError::api(
                status.as_u16(),
                format!("Request failed: {}", body),
            ));
        }

        envelope
            .data
            .ok_or_else(|| ExpoError::api(status.as_u16(), "Response is missing data"))
    }

    /// Send one batch of push messages.
    ///
    /// Returns one ticket per message, in the order the messages were given.
    ///
    /// POST /--/api/v2/push/send
    pub async fn send_push_notifications(
        &self,
        messages: &[ExpoPushMessage],
    ) -> Result<Vec<ExpoPushTicket>> {
        if messages.len() > PUSH_NOTIFICATION_CHUNK_LIMIT {
            return Err(ExpoError::invalid_request(format!(
                "At most {} messages per request, got {}",
                PUSH_NOTIFICATION_CHUNK_LIMIT,
                messages.len()
            )));
        }
        let url = format!("{}/--/api/v2/push/send", self.base_url);
        debug!("[expo] Sending {} push message(s)", messages.len());

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(messages)
            .send()
            .await?;

        let tickets: Vec<ExpoPushTicket> = Self::parse_response(response).await?;
        if tickets.len() != messages.len() {
            return Err(ExpoError::api(
                200,
                format!(
                    "Expected {} push ticket(s), got {}",
                    messages.len(),
                    tickets.len()
                ),
            ));
        }
        Ok(tickets)
    }

    /// Fetch receipts for previously issued tickets.
    ///
    /// Receipts not yet available are simply absent from the map.
    ///
    /// POST /--/api/v2/push/getReceipts
    pub async fn get_push_notification_receipts(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, ExpoPushReceipt>> {
        if ids.len() > PUSH_NOTIFICATION_RECEIPT_CHUNK_LIMIT {
            return Err(ExpoError::invalid_request(format!(
                "At most {} receipt ids per request, got {}",
                PUSH_NOTIFICATION_RECEIPT_CHUNK_LIMIT,
                ids.len()
            )));
        }
        let url = format!("{}/--/api/v2/push/getReceipts", self.base_url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(&ReceiptRequest { ids: ids.to_vec() })
            .send()
            .await?;

        Self::parse_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = ExpoPushClient::new(ExpoConfig {
            base_url: "http://localhost:9000/".into(),
            ..ExpoConfig::default()
        })
        .unwrap();
        assert_eq!(client.base_url, "http://localhost:9000");
    }

    #[test]
    fn test_headers_include_bearer_only_when_configured() {
        let anonymous = ExpoPushClient::new(ExpoConfig::default()).unwrap();
        assert!(anonymous.headers().unwrap().get(AUTHORIZATION).is_none());

        let empty = ExpoPushClient::new(ExpoConfig {
            access_token: Some(String::new()),
            ..ExpoConfig::default()
        })
        .unwrap();
        assert!(empty.headers().unwrap().get(AUTHORIZATION).is_none());

        let secured = ExpoPushClient::new(ExpoConfig {
            access_token: Some("secret".into()),
            ..ExpoConfig::default()
        })
        .unwrap();
        assert_eq!(
            secured.headers().unwrap().get(AUTHORIZATION).unwrap(),
            "Bearer secret"
        );
    }

    #[tokio::test]
    async fn test_oversized_batches_are_rejected_locally() {
        let client = ExpoPushClient::new(ExpoConfig {
            base_url: "http://127.0.0.1:9".into(),
            ..ExpoConfig::default()
        })
        .unwrap();
        let messages = vec![ExpoPushMessage::new("ExpoPushToken[a]"); PUSH_NOTIFICATION_CHUNK_LIMIT + 1];
        assert!(matches!(
            client.send_push_notifications(&messages).await,
            Err(ExpoError::InvalidRequest(_))
        ));

        let ids = vec!["id".to_string(); PUSH_NOTIFICATION_RECEIPT_CHUNK_LIMIT + 1];
        assert!(matches!(
            client.get_push_notification_receipts(&ids).await,
            Err(ExpoError::InvalidRequest(_))
        ));
    }
}
