//! HTTP adapters - REST collaborators.
//!
//! - `ReqwestNotificationsApi` - notification history and read confirmation

mod notifications_client;

pub use notifications_client::{NotificationsClientConfig, ReqwestNotificationsApi};
