//! Transport port - Interface for the bidirectional push connection.
//!
//! A `Transport` opens exactly one link per call. Reconnection, handshake
//! and routing live in the connection manager; adapters only move frames.
//!
//! # Link contract
//!
//! - Frames written to `outbound` are sent in order.
//! - Every inbound frame is delivered as `TransportSignal::Frame` in wire order.
//! - When the link ends the adapter sends one `TransportSignal::Closed`
//!   (or simply drops the sender, which the manager treats the same way).
//! - Dropping `outbound` asks the adapter to close the link.

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::connection::WireFrame;

/// Everything needed to open one authenticated link.
#[derive(Debug, Clone)]
pub struct ConnectRequest {
    pub url: String,
    pub token: SecretString,
}

/// Signals flowing from the adapter to the manager.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportSignal {
    Frame(WireFrame),
    Closed { reason: String },
}

/// An open link.
#[derive(Debug)]
pub struct TransportLink {
    pub outbound: mpsc::UnboundedSender<WireFrame>,
    pub inbound: mpsc::UnboundedReceiver<TransportSignal>,
}

/// Errors raised while opening a link.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Connection refused: {0}")]
    Refused(String),

    #[error("Authentication rejected: {0}")]
    Unauthorized(String),
}

/// Port for opening push connections.
///
/// # Example
///
/// ```ignore
/// let link = transport.open(&ConnectRequest { url, token }).await?;
/// link.outbound.send(OutboundCommand::Ping.to_frame())?;
/// while let Some(signal) = link.inbound.recv().await { /* ... */ }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Opens a new link. Each call creates a fresh transport session.
    async fn open(&self, request: &ConnectRequest) -> Result<TransportLink, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn Transport) {}

    #[test]
    fn transport_error_displays_reason() {
        let err = TransportError::Refused("127.0.0.1:9 unreachable".into());
        assert_eq!(err.to_string(), "Connection refused: 127.0.0.1:9 unreachable");
    }
}
