//! Notification entity as pushed by the server.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::{InternshipId, NotificationId, Timestamp, UserId};

/// Kind of notification, as labelled by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// A listing matched the user's saved criteria.
    NewMatch,
    /// An application deadline is approaching.
    DeadlineReminder,
    /// An application moved to another pipeline stage.
    StatusChange,
    /// A new internship was published.
    NewInternship,
    /// A listing the user follows changed.
    InternshipUpdated,
    /// Any label this client does not know yet.
    #[serde(other)]
    Other,
}

impl NotificationType {
    /// Every type the server is known to send.
    pub const KNOWN: [NotificationType; 5] = [
        NotificationType::NewMatch,
        NotificationType::DeadlineReminder,
        NotificationType::StatusChange,
        NotificationType::NewInternship,
        NotificationType::InternshipUpdated,
    ];

    /// Wire label of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::NewMatch => "new_match",
            NotificationType::DeadlineReminder => "deadline_reminder",
            NotificationType::StatusChange => "status_change",
            NotificationType::NewInternship => "new_internship",
            NotificationType::InternshipUpdated => "internship_updated",
            NotificationType::Other => "other",
        }
    }
}

fn default_delivery_method() -> String {
    "websocket".to_string()
}

/// A single notification held by the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,

    #[serde(alias = "user_id")]
    pub user_id: UserId,

    #[serde(default, alias = "internship_id")]
    pub internship_id: Option<InternshipId>,

    #[serde(rename = "type", alias = "notification_type")]
    pub notification_type: NotificationType,

    pub title: String,

    pub message: String,

    #[serde(default, alias = "is_read")]
    pub is_read: bool,

    #[serde(alias = "sent_at")]
    pub sent_at: Timestamp,

    #[serde(default = "default_delivery_method", alias = "delivery_method")]
    pub delivery_method: String,

    /// Opaque server-side extras.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Notification {
    /// Creates an unread notification sent now.
    pub fn new(
        id: NotificationId,
        user_id: UserId,
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id,
            user_id,
            internship_id: None,
            notification_type,
            title: title.into(),
            message: message.into(),
            is_read: false,
            sent_at: Timestamp::now(),
            delivery_method: default_delivery_method(),
            metadata: Map::new(),
        }
    }

    /// Marks the notification as already read.
    pub fn already_read(mut self) -> Self {
        self.is_read = true;
        self
    }
}
