//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the realtime core to external systems:
//! - `websocket` - tokio-tungstenite push transport
//! - `http` - reqwest client for the notification REST endpoints
//! - `auth` - token providers
//! - `platform` - headless toast, sound and desktop capabilities
//! - `mock` - in-memory transport and recording capabilities for tests

pub mod auth;
pub mod http;
pub mod mock;
pub mod platform;
pub mod websocket;

pub use auth::{SharedTokenProvider, StaticTokenProvider};
pub use http::{NotificationsClientConfig, ReqwestNotificationsApi};
pub use platform::{LogDesktopNotifier, LogToaster, TerminalBellPlayer};
pub use websocket::TungsteniteTransport;
