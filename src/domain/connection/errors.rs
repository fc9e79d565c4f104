//! Connection error types.

use thiserror::Error;

/// Why a `connect()` call was rejected.
///
/// Cloneable so every caller sharing a pending connect receives the same
/// outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("No authentication token available")]
    MissingToken,

    #[error("Transport connection failed: {0}")]
    Transport(String),

    #[error("Server did not acknowledge the session within {timeout_ms} ms")]
    HandshakeTimeout { timeout_ms: u64 },

    #[error("Connection closed before handshake: {0}")]
    ClosedDuringHandshake(String),

    #[error("Connection attempt cancelled by disconnect")]
    Cancelled,
}
