//! Realtime protocol types.
//!
//! Every transport frame is a JSON object `{"event": <name>, "data": <payload>}`.
//!
//! - Server → Client: [`RealtimeEvent`], decoded from a [`WireFrame`]
//! - Client → Server: [`OutboundCommand`], encoded into a [`WireFrame`]
//!
//! Lifecycle events (`connect_error`, `disconnect`, `reconnect`,
//! `reconnect_error`, `reconnect_failed`) are produced locally by the connection manager and
//! share the same enum so subscribers see one stream.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::domain::foundation::{InternshipId, NotificationId, Timestamp, ValidationError};
use crate::domain::notification::{Notification, NotificationPreferences};

/// Inbound and lifecycle event names.
pub mod names {
    pub const CONNECTED: &str = "connected";
    pub const CONNECT_ERROR: &str = "connect_error";
    pub const DISCONNECT: &str = "disconnect";
    pub const RECONNECT: &str = "reconnect";
    pub const RECONNECT_ERROR: &str = "reconnect_error";
    pub const RECONNECT_FAILED: &str = "reconnect_failed";
    pub const NEW_NOTIFICATION: &str = "new_notification";
    pub const NEW_INTERNSHIP_AVAILABLE: &str = "new_internship_available";
    pub const INTERNSHIP_UPDATED: &str = "internship_updated";
    pub const DEADLINE_REMINDER: &str = "deadline_reminder";
    pub const SEARCH_RESULTS_UPDATED: &str = "search_results_updated";
    pub const SERVER_SHUTDOWN: &str = "server_shutdown";
    pub const PONG: &str = "pong";
    pub const NOTIFICATION_READ: &str = "notification_read";
    pub const ALL_NOTIFICATIONS_READ: &str = "all_notifications_read";
}

/// Lifecycle names produced locally by the connection manager. A server
/// frame may not use them.
pub const LOCAL_LIFECYCLE_EVENT_TYPES: &[&str] = &[
    names::CONNECT_ERROR,
    names::DISCONNECT,
    names::RECONNECT,
    names::RECONNECT_ERROR,
    names::RECONNECT_FAILED,
];

/// Event names that touch the notification ledger.
pub const LEDGER_EVENT_TYPES: &[&str] = &[
    names::NEW_NOTIFICATION,
    names::NOTIFICATION_READ,
    names::ALL_NOTIFICATIONS_READ,
];

/// Event names that produce user-visible side effects.
pub const SIDE_EFFECT_EVENT_TYPES: &[&str] = &[
    names::NEW_NOTIFICATION,
    names::NEW_INTERNSHIP_AVAILABLE,
    names::DEADLINE_REMINDER,
    names::SERVER_SHUTDOWN,
    names::CONNECT_ERROR,
    names::RECONNECT_ERROR,
    names::RECONNECT_FAILED,
];

/// Raw transport frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireFrame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl WireFrame {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Parses a text frame.
    pub fn from_text(text: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(text)
            .map_err(|e| ValidationError::invalid_format("frame", e.to_string()))
    }

    /// Serializes to a text frame.
    pub fn to_text(&self) -> String {
        // A struct of String + Value always serializes.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Application-level handshake acknowledgement.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    #[serde(default)]
    pub timestamp: Option<Value>,
    #[serde(default, alias = "session_id")]
    pub session_id: Option<String>,
}

/// Minimal view of an internship listing carried by push events.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InternshipSummary {
    #[serde(default)]
    pub id: Option<InternshipId>,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "companyName")]
    pub company_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Deadline reminder payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadlineReminder {
    pub internship_title: String,
    pub company_name: String,
    #[serde(default)]
    pub internship_id: Option<InternshipId>,
    #[serde(default)]
    pub deadline: Option<String>,
}

#[derive(Deserialize)]
struct NewInternshipPayload {
    internship: InternshipSummary,
}

#[derive(Deserialize)]
struct InternshipUpdatedPayload {
    #[serde(default)]
    internship: Value,
    #[serde(default)]
    changes: Value,
}

#[derive(Deserialize)]
struct MessagePayload {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotificationReadPayload {
    #[serde(alias = "notification_id", alias = "id")]
    notification_id: NotificationId,
}

/// Tagged union of everything subscribers can observe.
#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeEvent {
    /// Server acknowledged the session.
    Connected(Handshake),
    /// The initial connect attempt failed; no reconnection follows.
    ConnectError { error: String },
    /// Link lost or closed.
    Disconnected { reason: String },
    /// Session re-established after `attempt_number` tries.
    Reconnected { attempt_number: u32 },
    /// A reconnection attempt failed.
    ReconnectError { attempt: u32, error: String },
    /// The attempt bound was exhausted; manual action required.
    ReconnectFailed { attempts: u32 },
    NewNotification(Notification),
    NewInternshipAvailable(InternshipSummary),
    InternshipUpdated { internship: Value, changes: Value },
    DeadlineReminder(DeadlineReminder),
    SearchResultsUpdated(Value),
    ServerShutdown { message: String },
    Pong(Value),
    /// Server echo of a read transition.
    NotificationRead(NotificationId),
    /// Server echo of mark-all-read.
    AllNotificationsRead,
    /// Any server event this client does not interpret.
    Other { name: String, data: Value },
}

impl RealtimeEvent {
    /// Normalized event name used for routing.
    pub fn name(&self) -> &str {
        match self {
            RealtimeEvent::Connected(_) => names::CONNECTED,
            RealtimeEvent::ConnectError { .. } => names::CONNECT_ERROR,
            RealtimeEvent::Disconnected { .. } => names::DISCONNECT,
            RealtimeEvent::Reconnected { .. } => names::RECONNECT,
            RealtimeEvent::ReconnectError { .. } => names::RECONNECT_ERROR,
            RealtimeEvent::ReconnectFailed { .. } => names::RECONNECT_FAILED,
            RealtimeEvent::NewNotification(_) => names::NEW_NOTIFICATION,
            RealtimeEvent::NewInternshipAvailable(_) => names::NEW_INTERNSHIP_AVAILABLE,
            RealtimeEvent::InternshipUpdated { .. } => names::INTERNSHIP_UPDATED,
            RealtimeEvent::DeadlineReminder(_) => names::DEADLINE_REMINDER,
            RealtimeEvent::SearchResultsUpdated(_) => names::SEARCH_RESULTS_UPDATED,
            RealtimeEvent::ServerShutdown { .. } => names::SERVER_SHUTDOWN,
            RealtimeEvent::Pong(_) => names::PONG,
            RealtimeEvent::NotificationRead(_) => names::NOTIFICATION_READ,
            RealtimeEvent::AllNotificationsRead => names::ALL_NOTIFICATIONS_READ,
            RealtimeEvent::Other { name, .. } => name,
        }
    }

    /// Decodes a server frame.
    ///
    /// Lifecycle names other than `connected` are reserved for locally
    /// produced events; a server frame using one is rejected.
    pub fn decode(frame: WireFrame) -> Result<Self, ValidationError> {
        let WireFrame { event, data } = frame;
        if is_local_lifecycle(&event) {
            return Err(ValidationError::invalid_format(
                event,
                "reserved for local lifecycle events",
            ));
        }
        let event = match event.as_str() {
            names::CONNECTED => RealtimeEvent::Connected(parse(&event, data)?),
            names::NEW_NOTIFICATION => RealtimeEvent::NewNotification(parse(&event, data)?),
            names::NEW_INTERNSHIP_AVAILABLE => {
                let payload: NewInternshipPayload = parse(&event, data)?;
                RealtimeEvent::NewInternshipAvailable(payload.internship)
            }
            names::INTERNSHIP_UPDATED => {
                let payload: InternshipUpdatedPayload = parse(&event, data)?;
                RealtimeEvent::InternshipUpdated {
                    internship: payload.internship,
                    changes: payload.changes,
                }
            }
            names::DEADLINE_REMINDER => RealtimeEvent::DeadlineReminder(parse(&event, data)?),
            names::SEARCH_RESULTS_UPDATED => RealtimeEvent::SearchResultsUpdated(data),
            names::SERVER_SHUTDOWN => {
                let payload: MessagePayload = parse(&event, data)?;
                RealtimeEvent::ServerShutdown {
                    message: payload.message,
                }
            }
            names::PONG => RealtimeEvent::Pong(data),
            names::NOTIFICATION_READ => {
                let payload: NotificationReadPayload = parse(&event, data)?;
                RealtimeEvent::NotificationRead(payload.notification_id)
            }
            names::ALL_NOTIFICATIONS_READ => RealtimeEvent::AllNotificationsRead,
            _ => RealtimeEvent::Other { name: event, data },
        };
        Ok(event)
    }
}

/// True for names only the connection manager may produce.
pub fn is_local_lifecycle(name: &str) -> bool {
    LOCAL_LIFECYCLE_EVENT_TYPES.contains(&name)
}

fn parse<T: DeserializeOwned>(event: &str, data: Value) -> Result<T, ValidationError> {
    // Payload-less events arrive with `data: null`.
    let data = if data.is_null() { json!({}) } else { data };
    serde_json::from_value(data).map_err(|e| ValidationError::invalid_format(event, e.to_string()))
}

/// Commands the client sends to the server. Fire-and-forget.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundCommand {
    UpdateNotificationPreferences(NotificationPreferences),
    MarkNotificationRead(NotificationId),
    MarkAllNotificationsRead,
    JoinInternshipUpdates(InternshipId),
    LeaveInternshipUpdates(InternshipId),
    Ping,
}

impl OutboundCommand {
    pub fn name(&self) -> &'static str {
        match self {
            OutboundCommand::UpdateNotificationPreferences(_) => "update_notification_preferences",
            OutboundCommand::MarkNotificationRead(_) => "mark_notification_read",
            OutboundCommand::MarkAllNotificationsRead => "mark_all_notifications_read",
            OutboundCommand::JoinInternshipUpdates(_) => "join_internship_updates",
            OutboundCommand::LeaveInternshipUpdates(_) => "leave_internship_updates",
            OutboundCommand::Ping => "ping",
        }
    }

    /// Encodes the command into a transport frame.
    pub fn to_frame(&self) -> WireFrame {
        let data = match self {
            OutboundCommand::UpdateNotificationPreferences(prefs) => {
                serde_json::to_value(prefs).unwrap_or(Value::Null)
            }
            OutboundCommand::MarkNotificationRead(id) => json!({ "notificationId": id }),
            OutboundCommand::MarkAllNotificationsRead => json!({}),
            OutboundCommand::JoinInternshipUpdates(id)
            | OutboundCommand::LeaveInternshipUpdates(id) => json!({ "internshipId": id }),
            OutboundCommand::Ping => json!({ "timestamp": Timestamp::now().to_rfc3339() }),
        };
        WireFrame::new(self.name(), data)
    }
}
