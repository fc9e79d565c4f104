//! Connection module - session state, protocol events and connect errors.

mod errors;
mod events;
mod state;

pub use errors::ConnectError;
pub use events::{
    is_local_lifecycle, names, DeadlineReminder, Handshake, InternshipSummary, OutboundCommand,
    RealtimeEvent, WireFrame, LEDGER_EVENT_TYPES, LOCAL_LIFECYCLE_EVENT_TYPES,
    SIDE_EFFECT_EVENT_TYPES,
};
pub use state::{ConnectionState, ConnectionStatus};
