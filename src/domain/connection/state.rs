//! Connection state as observed by the UI.

use serde::Serialize;

/// Coarse status for status indicators.
///
/// `Reconnecting` is transient; `Failed` is terminal and stays visible until
/// the user acknowledges it or starts a new connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting { attempt: u32 },
    Failed,
}

/// Snapshot of the single logical session.
///
/// Mutated only by the connection manager. `reconnect_attempts` resets to
/// zero whenever `connected` becomes true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionState {
    pub connected: bool,
    pub reconnect_attempts: u32,
    pub session_id: Option<String>,
    pub status: ConnectionStatus,
    pub last_error: Option<String>,
}

impl ConnectionState {
    /// Initial, disconnected state.
    pub fn new() -> Self {
        Self {
            connected: false,
            reconnect_attempts: 0,
            session_id: None,
            status: ConnectionStatus::Disconnected,
            last_error: None,
        }
    }

    pub(crate) fn mark_connecting(&mut self) {
        self.connected = false;
        self.reconnect_attempts = 0;
        self.status = ConnectionStatus::Connecting;
        self.last_error = None;
    }

    pub(crate) fn mark_connected(&mut self, session_id: Option<String>) {
        self.connected = true;
        self.reconnect_attempts = 0;
        self.session_id = session_id;
        self.status = ConnectionStatus::Connected;
        self.last_error = None;
    }

    pub(crate) fn mark_disconnected(&mut self, reason: Option<String>) {
        self.connected = false;
        self.session_id = None;
        self.status = ConnectionStatus::Disconnected;
        if reason.is_some() {
            self.last_error = reason;
        }
    }

    pub(crate) fn mark_reconnecting(&mut self) {
        self.connected = false;
        self.status = ConnectionStatus::Reconnecting {
            attempt: self.reconnect_attempts + 1,
        };
    }

    /// Records a failed reconnection attempt and returns the new count.
    pub(crate) fn record_failed_attempt(&mut self, error: impl Into<String>) -> u32 {
        self.connected = false;
        self.reconnect_attempts += 1;
        self.status = ConnectionStatus::Reconnecting {
            attempt: self.reconnect_attempts,
        };
        self.last_error = Some(error.into());
        self.reconnect_attempts
    }

    pub(crate) fn mark_failed(&mut self, error: impl Into<String>) {
        self.connected = false;
        self.session_id = None;
        self.status = ConnectionStatus::Failed;
        self.last_error = Some(error.into());
    }

    pub(crate) fn acknowledge_failure(&mut self) -> bool {
        if self.status == ConnectionStatus::Failed {
            self.status = ConnectionStatus::Disconnected;
            true
        } else {
            false
        }
    }

    /// True while a terminal failure is waiting for the user.
    pub fn requires_acknowledgement(&self) -> bool {
        self.status == ConnectionStatus::Failed
    }

    pub fn is_reconnecting(&self) -> bool {
        matches!(self.status, ConnectionStatus::Reconnecting { .. })
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_disconnected() {
        let state = ConnectionState::new();
        assert!(!state.connected);
        assert_eq!(state.reconnect_attempts, 0);
        assert_eq!(state.status, ConnectionStatus::Disconnected);
    }

    #[test]
    fn connecting_resets_attempts() {
        let mut state = ConnectionState::new();
        state.record_failed_attempt("boom");
        state.record_failed_attempt("boom");
        state.mark_connected(Some("s-1".into()));

        assert!(state.connected);
        assert_eq!(state.reconnect_attempts, 0);
        assert_eq!(state.session_id.as_deref(), Some("s-1"));
        assert!(state.last_error.is_none());
    }

    #[test]
    fn failed_attempts_accumulate() {
        let mut state = ConnectionState::new();
        state.mark_connected(None);
        state.mark_reconnecting();
        assert_eq!(state.status, ConnectionStatus::Reconnecting { attempt: 1 });

        assert_eq!(state.record_failed_attempt("refused"), 1);
        assert_eq!(state.record_failed_attempt("refused"), 2);
        assert!(state.is_reconnecting());
        assert!(!state.connected);
    }

    #[test]
    fn failure_requires_acknowledgement() {
        let mut state = ConnectionState::new();
        state.mark_failed("gave up");
        assert!(state.requires_acknowledgement());

        assert!(state.acknowledge_failure());
        assert!(!state.requires_acknowledgement());
        assert!(!state.acknowledge_failure());
    }

    #[test]
    fn status_serializes_with_tag() {
        let json = serde_json::to_value(ConnectionStatus::Reconnecting { attempt: 3 }).unwrap();
        assert_eq!(json["status"], "reconnecting");
        assert_eq!(json["attempt"], 3);
    }
}
