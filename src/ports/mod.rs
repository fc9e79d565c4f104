//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the realtime core and the outside world. Adapters implement these ports.
//!
//! ## Event Ports
//!
//! - `EventHandler` - Observer invoked for a routed event
//! - `EventSubscriber` - Registry seam for subscribing and unsubscribing
//!
//! ## Connection Ports
//!
//! - `Transport` - Opens one bidirectional push link
//! - `TokenProvider` - Current bearer token from the auth collaborator
//!
//! ## Platform Ports
//!
//! - `Toaster`, `SoundPlayer`, `DesktopNotifier` - Host capabilities used
//!   for best-effort side effects
//!
//! ## REST Ports
//!
//! - `NotificationsApi` - Notification history and read confirmation

mod event_subscriber;
mod notifications_api;
mod side_effects;
mod token_provider;
mod transport;

pub use event_subscriber::{EventHandler, EventSubscriber};
pub use notifications_api::{ApiEnvelope, ApiError, ApiErrorBody, NotificationsApi};
pub use side_effects::{DesktopNotifier, SideEffectError, SoundPlayer, Toaster};
pub use token_provider::TokenProvider;
pub use transport::{ConnectRequest, Transport, TransportError, TransportLink, TransportSignal};
