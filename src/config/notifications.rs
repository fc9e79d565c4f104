//! Notification ledger and side-effect configuration

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::notification::{NotificationPreferences, DEFAULT_RETENTION_CAP};

/// Notification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationsConfig {
    /// Maximum notifications kept in the local ledger
    #[serde(default = "default_retention_cap")]
    pub retention_cap: usize,

    /// Initial sound preference
    #[serde(default = "default_enable_sound")]
    pub enable_sound: bool,

    /// Initial desktop-notification preference
    #[serde(default)]
    pub enable_desktop: bool,
}

impl NotificationsConfig {
    /// Starting preferences; every known type enabled
    pub fn initial_preferences(&self) -> NotificationPreferences {
        NotificationPreferences::new(self.enable_sound, self.enable_desktop)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.retention_cap == 0 || self.retention_cap > 10_000 {
            return Err(ValidationError::InvalidRetentionCap);
        }
        Ok(())
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            retention_cap: default_retention_cap(),
            enable_sound: default_enable_sound(),
            enable_desktop: false,
        }
    }
}

fn default_retention_cap() -> usize {
    DEFAULT_RETENTION_CAP
}

fn default_enable_sound() -> bool {
    true
}
