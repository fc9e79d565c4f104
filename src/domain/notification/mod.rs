//! Notification module - notification entity, preferences and the ledger.

mod ledger;
mod notification;
mod preferences;

pub use ledger::{NotificationLedger, DEFAULT_RETENTION_CAP};
pub use notification::{Notification, NotificationType};
pub use preferences::NotificationPreferences;
