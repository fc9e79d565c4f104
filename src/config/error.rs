//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid push server URL: must start with ws:// or wss://")]
    InvalidPushUrl,

    #[error("Push server URL must use wss:// in production")]
    PushUrlMustBeSecure,

    #[error("Invalid API base URL: must start with http:// or https://")]
    InvalidApiUrl,

    #[error("Invalid handshake timeout")]
    InvalidHandshakeTimeout,

    #[error("Reconnect attempts must be between 1 and 50")]
    InvalidReconnectAttempts,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Retention cap must be between 1 and 10000")]
    InvalidRetentionCap,

    #[error("History limit must not exceed the retention cap")]
    HistoryLimitExceedsCap,

    #[error("Invalid log filter: {0}")]
    InvalidLogFilter(String),
}
