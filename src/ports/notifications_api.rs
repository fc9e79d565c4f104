//! NotificationsApi port - REST access to notification history.
//!
//! The REST CRUD services are external collaborators. The realtime core
//! only uses them to refresh its own cache: seeding the ledger after a
//! connect and confirming read transitions.
//!
//! Every response uses the JSON envelope
//! `{ "success": bool, "data": ..., "error": { "message": ... } }`.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::NotificationId;
use crate::domain::notification::Notification;

/// Error body inside an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
}

/// Standard response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiErrorBody>,
}

impl<T> ApiEnvelope<T> {
    /// Unwraps the payload or turns the envelope into an `ApiError`.
    pub fn into_result(self) -> Result<T, ApiError> {
        match (self.success, self.data, self.error) {
            (true, Some(data), _) => Ok(data),
            (true, None, _) => Err(ApiError::Decode("successful envelope without data".into())),
            (false, _, error) => Err(Self::rejection(error)),
        }
    }

    /// Accepts any successful envelope; `data` may be absent.
    pub fn into_ack(self) -> Result<(), ApiError> {
        if self.success {
            Ok(())
        } else {
            Err(Self::rejection(self.error))
        }
    }

    fn rejection(error: Option<ApiErrorBody>) -> ApiError {
        ApiError::Rejected {
            message: error.map_or_else(|| "request failed".into(), |body| body.message),
        }
    }
}

/// REST failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("No authentication token available")]
    MissingToken,

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("Server rejected request: {message}")]
    Rejected { message: String },

    #[error("Invalid response body: {0}")]
    Decode(String),
}

/// Port for the notification REST endpoints.
#[async_trait]
pub trait NotificationsApi: Send + Sync {
    /// Most recent notifications, newest-first.
    async fn recent_notifications(
        &self,
        token: &SecretString,
        limit: usize,
    ) -> Result<Vec<Notification>, ApiError>;

    /// Persists a read transition server-side.
    async fn mark_read(&self, token: &SecretString, id: NotificationId) -> Result<(), ApiError>;
}
