//! Application layer - the realtime core's moving parts.
//!
//! - `EventRouter` - name-keyed observer registry with fault isolation
//! - `ConnectionManager` - session lifecycle, handshake and reconnection
//! - `NotificationCenter` - lock-guarded notification ledger
//! - `SideEffectDispatcher` - toast, sound and desktop presentation
//! - `RealtimeClient` - init/teardown context wiring the above together

mod connection_manager;
mod event_router;
mod notification_center;
mod realtime_client;
mod side_effect_dispatcher;

pub use connection_manager::{
    ConnectOutcome, ConnectionManager, ConnectionSettings, DEFAULT_HANDSHAKE_TIMEOUT,
    DEFAULT_MAX_RECONNECT_ATTEMPTS, DEFAULT_RECONNECT_DELAY,
};
pub use event_router::{DispatchReport, EventRouter, FnHandler};
pub use notification_center::NotificationCenter;
pub use realtime_client::{RealtimeClient, RealtimeDeps, RealtimeOptions};
pub use side_effect_dispatcher::{SideEffectDispatcher, SideEffectPorts};
