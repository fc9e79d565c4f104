//! Push connection configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::telemetry::Environment;
use crate::application::ConnectionSettings;

/// Push server connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    /// WebSocket endpoint of the push server
    #[serde(default = "default_url")]
    pub url: String,

    /// Deadline for the server's `connected` handshake
    #[serde(default = "default_handshake_timeout_ms")]
    pub handshake_timeout_ms: u64,

    /// Reconnection attempts before giving up
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    /// Fixed delay before each reconnection attempt
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

impl ConnectionConfig {
    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Settings consumed by the connection manager
    pub fn settings(&self) -> ConnectionSettings {
        ConnectionSettings::new(self.url.clone())
            .with_handshake_timeout(self.handshake_timeout())
            .with_reconnect_policy(self.max_reconnect_attempts, self.reconnect_delay())
    }

    /// Validate connection configuration
    ///
    /// Production deployments must use a TLS endpoint.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("CONNECTION__URL"));
        }
        if !self.url.starts_with("ws://") && !self.url.starts_with("wss://") {
            return Err(ValidationError::InvalidPushUrl);
        }
        if *environment == Environment::Production && !self.url.starts_with("wss://") {
            return Err(ValidationError::PushUrlMustBeSecure);
        }
        if self.handshake_timeout_ms == 0 || self.handshake_timeout_ms > 120_000 {
            return Err(ValidationError::InvalidHandshakeTimeout);
        }
        if self.max_reconnect_attempts == 0 || self.max_reconnect_attempts > 50 {
            return Err(ValidationError::InvalidReconnectAttempts);
        }
        Ok(())
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            handshake_timeout_ms: default_handshake_timeout_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

fn default_url() -> String {
    "ws://localhost:5000/socket".to_string()
}

fn default_handshake_timeout_ms() -> u64 {
    10_000
}

fn default_max_reconnect_attempts() -> u32 {
    5
}

fn default_reconnect_delay_ms() -> u64 {
    1_000
}
