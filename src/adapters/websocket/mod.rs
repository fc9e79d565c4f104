//! WebSocket transport for the push server.
//!
//! ```text
//! ConnectionManager
//!     │  outbound WireFrame            inbound TransportSignal ▲
//!     ▼                                                        │
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    TungsteniteTransport                       │
//! │   send task: WireFrame -> JSON text frame                     │
//! │   recv task: text frame -> WireFrame, close -> Closed         │
//! └──────────────────────────────────────────────────────────────┘
//!     │                                                        ▲
//!     ▼                 wss://push-server/socket               │
//! ```
//!
//! Every frame is a JSON text message `{"event": ..., "data": ...}`.
//! Binary frames and malformed JSON are logged and dropped.

mod tungstenite_transport;

pub use tungstenite_transport::TungsteniteTransport;
