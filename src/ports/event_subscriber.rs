//! EventSubscriber port - Interface for subscribing to realtime events.
//!
//! This port defines how consumers register interest in realtime events
//! without knowing about the transport that produced them.

use std::sync::Arc;

use crate::domain::connection::RealtimeEvent;
use crate::domain::foundation::DomainError;

/// Handler for realtime events.
///
/// Handlers are invoked synchronously, in registration order, on the
/// dispatching task. Implementations should be:
/// - **Quick** - long work belongs on a spawned task
/// - **Isolated** - an error or panic is logged and does not stop delivery
///   to the remaining handlers
///
/// # Example
///
/// ```ignore
/// struct BadgeUpdater { /* ... */ }
///
/// impl EventHandler for BadgeUpdater {
///     fn handle(&self, event: &RealtimeEvent) -> Result<(), DomainError> {
///         if let RealtimeEvent::NewNotification(n) = event {
///             // bump badge...
///         }
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "BadgeUpdater"
///     }
/// }
/// ```
pub trait EventHandler: Send + Sync {
    /// Process an event.
    fn handle(&self, event: &RealtimeEvent) -> Result<(), DomainError>;

    /// Handler name used in log lines.
    fn name(&self) -> &'static str;
}

/// Port for subscribing to realtime events by name.
///
/// Registering the same handler twice under one name delivers the event
/// twice. Removal compares handlers by reference identity.
pub trait EventSubscriber: Send + Sync {
    /// Subscribe handler to one event name.
    fn subscribe(&self, event_name: &str, handler: Arc<dyn EventHandler>);

    /// Subscribe handler to several event names.
    fn subscribe_all(&self, event_names: &[&str], handler: Arc<dyn EventHandler>);

    /// Remove the first registration of `handler` under `event_name`.
    ///
    /// Returns false when it was not registered.
    fn unsubscribe(&self, event_name: &str, handler: &Arc<dyn EventHandler>) -> bool;
}
