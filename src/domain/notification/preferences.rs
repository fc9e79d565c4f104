//! Client-local notification preferences.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::NotificationType;

/// Which notifications the user wants surfaced, and how.
///
/// Pushed to the server whenever it changes; no acknowledgement is awaited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    pub enabled_types: BTreeSet<NotificationType>,
    pub enable_sound: bool,
    pub enable_desktop: bool,
}

impl NotificationPreferences {
    /// Preferences with every known type enabled.
    pub fn new(enable_sound: bool, enable_desktop: bool) -> Self {
        Self {
            enabled_types: NotificationType::KNOWN.into_iter().collect(),
            enable_sound,
            enable_desktop,
        }
    }

    /// Whether side effects should fire for this type.
    ///
    /// Unknown types follow the toast default and are always surfaced.
    pub fn is_enabled(&self, notification_type: NotificationType) -> bool {
        notification_type == NotificationType::Other
            || self.enabled_types.contains(&notification_type)
    }

    /// Returns a copy with `notification_type` switched on or off.
    pub fn with_type(mut self, notification_type: NotificationType, enabled: bool) -> Self {
        if enabled {
            self.enabled_types.insert(notification_type);
        } else {
            self.enabled_types.remove(&notification_type);
        }
        self
    }
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self::new(true, false)
    }
}
