//! reqwest implementation of the `NotificationsApi` port.
//!
//! Endpoints, relative to the configured base URL:
//!
//! - `GET  /notifications?limit=N` -> envelope of `Notification[]`
//! - `PUT  /notifications/{id}/read` -> envelope, `data` optional

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::domain::foundation::NotificationId;
use crate::domain::notification::Notification;
use crate::ports::{ApiEnvelope, ApiError, NotificationsApi};

/// Configuration for the REST client.
#[derive(Debug, Clone)]
pub struct NotificationsClientConfig {
    /// Base URL, e.g. `https://api.example.com/api`.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl NotificationsClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(15),
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// REST client for notification history.
pub struct ReqwestNotificationsApi {
    config: NotificationsClientConfig,
    client: Client,
}

impl ReqwestNotificationsApi {
    pub fn new(config: NotificationsClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, request: RequestBuilder, token: &SecretString) -> RequestBuilder {
        request
            .header("Authorization", format!("Bearer {}", token.expose_secret()))
            .header("Accept", "application/json")
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Transport(format!("timed out after {}s", self.config.timeout.as_secs()))
            } else {
                ApiError::Transport(e.to_string())
            }
        })
    }

    async fn read_body(response: Response) -> Result<(StatusCode, String), ApiError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok((status, body))
    }
}

/// Parses the envelope of a response, mapping unusable replies to an
/// `ApiError`.
///
/// Error statuses still carry an envelope most of the time; its message
/// wins over the bare status code.
fn parse_envelope<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
) -> Result<ApiEnvelope<T>, ApiError> {
    match serde_json::from_str::<ApiEnvelope<T>>(body) {
        Ok(envelope) if status.is_success() || !envelope.success => Ok(envelope),
        Ok(_) => Err(ApiError::Status(status.as_u16())),
        Err(_) if !status.is_success() => Err(ApiError::Status(status.as_u16())),
        Err(e) => Err(ApiError::Decode(e.to_string())),
    }
}

/// Envelope payload or an `ApiError`.
fn decode_envelope<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ApiError> {
    parse_envelope(status, body)?.into_result()
}

/// Success of a command endpoint; a payload is not required.
fn decode_ack(status: StatusCode, body: &str) -> Result<(), ApiError> {
    parse_envelope::<serde_json::Value>(status, body)?.into_ack()
}

#[async_trait]
impl NotificationsApi for ReqwestNotificationsApi {
    async fn recent_notifications(
        &self,
        token: &SecretString,
        limit: usize,
    ) -> Result<Vec<Notification>, ApiError> {
        let request = self
            .client
            .get(self.url("notifications"))
            .query(&[("limit", limit)]);
        let response = self.send(self.authorized(request, token)).await?;
        let (status, body) = Self::read_body(response).await?;
        let notifications: Vec<Notification> = decode_envelope(status, &body)?;
        tracing::debug!(count = notifications.len(), "Fetched notification history");
        Ok(notifications)
    }

    async fn mark_read(&self, token: &SecretString, id: NotificationId) -> Result<(), ApiError> {
        let request = self.client.put(self.url(&format!("notifications/{}/read", id)));
        let response = self.send(self.authorized(request, token)).await?;
        let (status, body) = Self::read_body(response).await?;
        decode_ack(status, &body)
    }
}
