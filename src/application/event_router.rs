//! EventRouter - typed publish/subscribe registry for realtime events.
//!
//! Decouples transport wire names from the consumers of those events.
//! Delivery is synchronous, in registration order, and each handler is
//! isolated from the others: an error or a panic in one handler is logged
//! with the event name and the remaining handlers still run.
//!
//! # Example
//!
//! ```ignore
//! let router = EventRouter::new();
//! let handle = router.on_fn("pong", "PongLogger", |event| {
//!     tracing::debug!(?event, "pong");
//!     Ok(())
//! });
//! router.dispatch(&RealtimeEvent::Pong(json!({})));
//! router.off("pong", &handle);
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::domain::connection::RealtimeEvent;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{EventHandler, EventSubscriber};

/// Outcome of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchReport {
    /// Handlers that returned `Ok`.
    pub delivered: usize,
    /// Handlers that returned an error or panicked.
    pub failed: usize,
}

/// Adapts a closure into an `EventHandler`.
pub struct FnHandler<F> {
    name: &'static str,
    f: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&RealtimeEvent) -> Result<(), DomainError> + Send + Sync + 'static,
{
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }
}

impl<F> EventHandler for FnHandler<F>
where
    F: Fn(&RealtimeEvent) -> Result<(), DomainError> + Send + Sync + 'static,
{
    fn handle(&self, event: &RealtimeEvent) -> Result<(), DomainError> {
        (self.f)(event)
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Registry mapping event name to an ordered list of handlers.
pub struct EventRouter {
    handlers: RwLock<HashMap<String, Vec<Arc<dyn EventHandler>>>>,
}

impl EventRouter {
    /// Creates an empty router.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a handler for `event_name`.
    pub fn on(&self, event_name: &str, handler: Arc<dyn EventHandler>) {
        self.handlers
            .write()
            .entry(event_name.to_string())
            .or_default()
            .push(handler);
    }

    /// Registers a closure and returns the handle needed to remove it.
    pub fn on_fn<F>(&self, event_name: &str, name: &'static str, f: F) -> Arc<dyn EventHandler>
    where
        F: Fn(&RealtimeEvent) -> Result<(), DomainError> + Send + Sync + 'static,
    {
        let handler: Arc<dyn EventHandler> = Arc::new(FnHandler::new(name, f));
        self.on(event_name, Arc::clone(&handler));
        handler
    }

    /// Removes the first registration of `handler` (by identity).
    ///
    /// Unknown handlers are ignored.
    pub fn off(&self, event_name: &str, handler: &Arc<dyn EventHandler>) -> bool {
        let mut handlers = self.handlers.write();
        let Some(list) = handlers.get_mut(event_name) else {
            return false;
        };
        let Some(pos) = list.iter().position(|h| same_handler(h, handler)) else {
            return false;
        };
        list.remove(pos);
        if list.is_empty() {
            handlers.remove(event_name);
        }
        true
    }

    /// Number of registrations for `event_name`.
    pub fn handler_count(&self, event_name: &str) -> usize {
        self.handlers
            .read()
            .get(event_name)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Drops every registration.
    pub fn clear(&self) {
        self.handlers.write().clear();
    }

    /// Delivers `event` to every handler registered under its name.
    pub fn dispatch(&self, event: &RealtimeEvent) -> DispatchReport {
        // Snapshot so handlers may subscribe or unsubscribe re-entrantly.
        let type_handlers: Vec<Arc<dyn EventHandler>> = self
            .handlers
            .read()
            .get(event.name())
            .cloned()
            .unwrap_or_default();

        let mut report = DispatchReport::default();
        for handler in type_handlers {
            match catch_unwind(AssertUnwindSafe(|| handler.handle(event))) {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(e)) => {
                    report.failed += 1;
                    tracing::warn!(
                        event = %event.name(),
                        handler = handler.name(),
                        error = %e,
                        "Event handler returned an error"
                    );
                }
                Err(panic) => {
                    report.failed += 1;
                    let error = DomainError::new(
                        ErrorCode::InternalError,
                        format!("panicked: {}", panic_message(panic.as_ref())),
                    )
                    .with_detail("handler", handler.name());
                    tracing::error!(
                        event = %event.name(),
                        handler = handler.name(),
                        error = %error,
                        "Event handler panicked"
                    );
                }
            }
        }
        report
    }
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSubscriber for EventRouter {
    fn subscribe(&self, event_name: &str, handler: Arc<dyn EventHandler>) {
        self.on(event_name, handler);
    }

    fn subscribe_all(&self, event_names: &[&str], handler: Arc<dyn EventHandler>) {
        let mut handlers = self.handlers.write();
        for event_name in event_names {
            handlers
                .entry(event_name.to_string())
                .or_default()
                .push(Arc::clone(&handler));
        }
    }

    fn unsubscribe(&self, event_name: &str, handler: &Arc<dyn EventHandler>) -> bool {
        self.off(event_name, handler)
    }
}

fn same_handler(a: &Arc<dyn EventHandler>, b: &Arc<dyn EventHandler>) -> bool {
    // Compare data pointers only; vtable pointers may differ across codegen units.
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn pong() -> RealtimeEvent {
        RealtimeEvent::Pong(json!({"timestamp": 1}))
    }

    struct CountingHandler(Arc<AtomicUsize>);

    impl EventHandler for CountingHandler {
        fn handle(&self, _: &RealtimeEvent) -> Result<(), DomainError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn name(&self) -> &'static str {
            "CountingHandler"
        }
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let router = EventRouter::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for label in ["a", "b", "c"] {
            let order = Arc::clone(&order);
            router.on_fn("pong", "Recorder", move |_| {
                order.lock().push(label);
                Ok(())
            });
        }

        let report = router.dispatch(&pong());
        assert_eq!(report.delivered, 3);
        assert_eq!(*order.lock(), vec!["a", "b", "c"]);
    }

    #[test]
    fn same_handler_registered_twice_fires_twice() {
        let router = EventRouter::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let handler: Arc<dyn EventHandler> = Arc::new(CountingHandler(counter.clone()));

        router.on("pong", Arc::clone(&handler));
        router.on("pong", Arc::clone(&handler));
        router.dispatch(&pong());

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn off_removes_one_registration_by_identity() {
        let router = EventRouter::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let handler: Arc<dyn EventHandler> = Arc::new(CountingHandler(counter.clone()));
        let other: Arc<dyn EventHandler> = Arc::new(CountingHandler(counter.clone()));

        router.on("pong", Arc::clone(&handler));
        router.on("pong", Arc::clone(&handler));
        router.on("pong", Arc::clone(&other));

        assert!(router.off("pong", &handler));
        assert_eq!(router.handler_count("pong"), 2);

        router.dispatch(&pong());
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn off_unknown_handler_is_noop() {
        let router = EventRouter::new();
        let stranger: Arc<dyn EventHandler> = Arc::new(CountingHandler(Arc::new(AtomicUsize::new(0))));

        assert!(!router.off("pong", &stranger));
        router.on_fn("pong", "Noop", |_| Ok(()));
        assert!(!router.off("pong", &stranger));
        assert_eq!(router.handler_count("pong"), 1);
    }

    #[test]
    fn panicking_handler_does_not_stop_others() {
        let router = EventRouter::new();
        let counter = Arc::new(AtomicUsize::new(0));

        router.on_fn("pong", "Exploder", |_| panic!("subscriber A blew up"));
        router.on("pong", Arc::new(CountingHandler(counter.clone())));

        let report = router.dispatch(&pong());

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(report, DispatchReport { delivered: 1, failed: 1 });

        // Router still usable afterwards.
        router.dispatch(&pong());
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn erroring_handler_is_counted_as_failed() {
        let router = EventRouter::new();
        router.on_fn("pong", "Failing", |_| {
            Err(DomainError::new(ErrorCode::InternalError, "nope"))
        });
        let counter = Arc::new(AtomicUsize::new(0));
        router.on("pong", Arc::new(CountingHandler(counter.clone())));

        let report = router.dispatch(&pong());
        assert_eq!(report.failed, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dispatch_only_reaches_matching_name() {
        let router = EventRouter::new();
        let counter = Arc::new(AtomicUsize::new(0));
        router.subscribe_all(
            &["pong", "server_shutdown"],
            Arc::new(CountingHandler(counter.clone())),
        );

        router.dispatch(&pong());
        router.dispatch(&RealtimeEvent::ServerShutdown { message: "bye".into() });
        router.dispatch(&RealtimeEvent::AllNotificationsRead);

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn handler_may_unsubscribe_itself_during_dispatch() {
        let router = Arc::new(EventRouter::new());
        let slot: Arc<Mutex<Option<Arc<dyn EventHandler>>>> = Arc::new(Mutex::new(None));
        let calls = Arc::new(AtomicUsize::new(0));

        let handle = {
            let inner = Arc::clone(&router);
            let slot = Arc::clone(&slot);
            let calls = Arc::clone(&calls);
            router.on_fn("pong", "OneShot", move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                if let Some(me) = slot.lock().take() {
                    inner.off("pong", &me);
                }
                Ok(())
            })
        };
        *slot.lock() = Some(handle);

        router.dispatch(&pong());
        router.dispatch(&pong());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(router.handler_count("pong"), 0);
    }
}
