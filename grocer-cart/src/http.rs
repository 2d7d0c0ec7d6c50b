//! REST implementation of [`BagBackend`].

use crate::backend::BagBackend;
use crate::error::{CartError, CartResult};
use async_trait::async_trait;
use grocer_types::wire::{ApiErrorBody, BagSnapshotRecord, MutateItemRequest, MutateItemResponse};
use grocer_types::BagSnapshot;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Path of the bag snapshot endpoint.
pub const BAG_PATH: &str = "/api/v1/bag";
/// Path of the item mutation endpoint.
pub const MUTATE_ITEM_PATH: &str = "/api/v1/bag/items";

/// Configuration for [`HttpBagClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Base URL of the storefront API (e.g. `https://api.example.com`).
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Bearer token from the sign-in flow, if signed in.
    pub auth_token: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            timeout_secs: 30,
            auth_token: None,
        }
    }
}

/// Bag backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBagClient {
    config: HttpClientConfig,
    client: Client,
}

impl HttpBagClient {
    /// Creates a client.
    pub fn new(config: HttpClientConfig) -> CartResult<Self> {
        if config.base_url.trim().is_empty() {
            return Err(CartError::Config("base_url is empty".into()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CartError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> CartResult<Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| CartError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!(status = status.as_u16(), error = %e, "Failed to read error body");
                String::new()
            }
        };
        let message = rejection_message(status, body);
        Err(CartError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

/// Message for a non-2xx answer: the `message` field of a JSON error body,
/// else the raw body, else the status's reason phrase.
fn rejection_message(status: StatusCode, body: String) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(&body) {
        return parsed.message;
    }
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string();
    }
    body
}

#[async_trait]
impl BagBackend for HttpBagClient {
    async fn fetch_bag(&self) -> CartResult<BagSnapshot> {
        let response = self.send(self.client.get(self.url(BAG_PATH))).await?;
        let body = response
            .text()
            .await
            .map_err(|e| CartError::Network(format!("failed to read bag: {e}")))?;
        let snapshot = BagSnapshotRecord::from_json(&body)?;
        debug!(lines = snapshot.lines().len(), "Fetched bag");
        Ok(snapshot)
    }

    async fn mutate_item(&self, request: &MutateItemRequest) -> CartResult<()> {
        let response = self
            .send(self.client.post(self.url(MUTATE_ITEM_PATH)).json(request))
            .await?;
        let body = response
            .text()
            .await
            .map_err(|e| CartError::Network(format!("failed to read response: {e}")))?;
        let parsed: MutateItemResponse = serde_json::from_str(&body)?;
        if !parsed.success {
            return Err(CartError::Declined);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_body_falls_back_to_reason_phrase() {
        assert_eq!(
            rejection_message(StatusCode::BAD_GATEWAY, String::new()),
            "Bad Gateway"
        );
    }

    #[test]
    fn json_message_wins_over_raw_body() {
        let body = r#"{"message": "only 2 left in stock"}"#.to_string();
        assert_eq!(
            rejection_message(StatusCode::CONFLICT, body),
            "only 2 left in stock"
        );
    }

    #[test]
    fn unknown_status_without_body() {
        let status = StatusCode::from_u16(599).unwrap();
        assert_eq!(rejection_message(status, "  ".into()), "request failed");
    }
}
