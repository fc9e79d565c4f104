//! REST API configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// REST notification API configuration
///
/// History sync is disabled when `base_url` is unset.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the REST API, e.g. `https://api.example.com/api`
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Notifications fetched by a history sync
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn is_enabled(&self) -> bool {
        self.base_url.is_some()
    }

    pub fn validate(&self, retention_cap: usize) -> Result<(), ValidationError> {
        if let Some(url) = &self.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidApiUrl);
            }
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.history_limit > retention_cap {
            return Err(ValidationError::HistoryLimitExceedsCap);
        }
        Ok(())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            request_timeout_secs: default_request_timeout(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_request_timeout() -> u64 {
    15
}

fn default_history_limit() -> usize {
    50
}
