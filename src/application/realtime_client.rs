//! RealtimeClient - the explicit context that owns one realtime session.
//!
//! `init` wires router, ledger, connection manager and side-effect
//! dispatcher together; `teardown` disconnects and drops local state. With a
//! REST API configured, history is merged into the ledger after every new
//! session, including automatic reconnects. Tests
//! build isolated instances; an application builds exactly one and shares
//! it (the client is cheap to clone).
//!
//! # Example
//!
//! ```ignore
//! let client = RealtimeClient::init(RealtimeOptions::from_config(&config), deps);
//! client.connect().await?;
//! let mut unread = client.watch_unread();
//! client.mark_read(NotificationId::new(1));
//! client.teardown();
//! ```

use std::sync::Arc;

use tokio::sync::watch;

use crate::application::{
    ConnectionManager, ConnectionSettings, EventRouter, NotificationCenter, SideEffectDispatcher,
    SideEffectPorts,
};
use crate::config::AppConfig;
use crate::domain::alerts::DesktopPermission;
use crate::domain::connection::{names, ConnectError, ConnectionState, OutboundCommand, RealtimeEvent};
use crate::domain::foundation::{DomainError, InternshipId, NotificationId};
use crate::domain::notification::{Notification, NotificationPreferences, DEFAULT_RETENTION_CAP};
use crate::ports::{
    ApiError, DesktopNotifier, EventHandler, NotificationsApi, SoundPlayer, Toaster, TokenProvider,
    Transport,
};

/// Tunables for one client.
#[derive(Debug, Clone)]
pub struct RealtimeOptions {
    pub connection: ConnectionSettings,
    pub retention_cap: usize,
    pub preferences: NotificationPreferences,
    pub history_limit: usize,
}

impl RealtimeOptions {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            connection: ConnectionSettings::new(url),
            retention_cap: DEFAULT_RETENTION_CAP,
            preferences: NotificationPreferences::default(),
            history_limit: 50,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            connection: config.connection.settings(),
            retention_cap: config.notifications.retention_cap,
            preferences: config.notifications.initial_preferences(),
            history_limit: config.api.history_limit,
        }
    }

    pub fn with_connection(mut self, connection: ConnectionSettings) -> Self {
        self.connection = connection;
        self
    }

    pub fn with_retention_cap(mut self, cap: usize) -> Self {
        self.retention_cap = cap;
        self
    }

    pub fn with_preferences(mut self, preferences: NotificationPreferences) -> Self {
        self.preferences = preferences;
        self
    }
}

/// Collaborators injected into the client.
#[derive(Clone)]
pub struct RealtimeDeps {
    pub transport: Arc<dyn Transport>,
    pub token_provider: Arc<dyn TokenProvider>,
    pub toaster: Arc<dyn Toaster>,
    pub sound: Arc<dyn SoundPlayer>,
    pub desktop: Arc<dyn DesktopNotifier>,
    /// REST history; `None` disables `sync_history`.
    pub notifications_api: Option<Arc<dyn NotificationsApi>>,
}

/// Merges REST history into the ledger.
///
/// Subscribed to `reconnect` so notifications pushed during an outage are
/// picked up once the session is back.
#[derive(Clone)]
struct HistorySync {
    api: Arc<dyn NotificationsApi>,
    token_provider: Arc<dyn TokenProvider>,
    notifications: Arc<NotificationCenter>,
    limit: usize,
}

impl HistorySync {
    async fn run(&self) -> Result<usize, ApiError> {
        let token = self
            .token_provider
            .current_token()
            .await
            .ok_or(ApiError::MissingToken)?;

        let history = self.api.recent_notifications(&token, self.limit).await?;
        let loaded = self.notifications.merge_history(history);
        tracing::info!(loaded, unread = self.notifications.unread_count(), "History synced");
        Ok(loaded)
    }
}

impl EventHandler for HistorySync {
    fn handle(&self, event: &RealtimeEvent) -> Result<(), DomainError> {
        let RealtimeEvent::Reconnected { attempt_number } = event else {
            return Ok(());
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("History resync skipped: no async runtime");
            return Ok(());
        };

        let sync = self.clone();
        let attempt_number = *attempt_number;
        runtime.spawn(async move {
            if let Err(e) = sync.run().await {
                tracing::warn!(error = %e, attempt_number, "History resync after reconnect failed");
            }
        });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "HistorySync"
    }
}

#[derive(Clone)]
pub struct RealtimeClient {
    router: Arc<EventRouter>,
    connection: ConnectionManager,
    notifications: Arc<NotificationCenter>,
    side_effects: Arc<SideEffectDispatcher>,
    token_provider: Arc<dyn TokenProvider>,
    history: Option<HistorySync>,
}

impl RealtimeClient {
    /// Builds an isolated client. Nothing connects until `connect()`.
    pub fn init(options: RealtimeOptions, deps: RealtimeDeps) -> Self {
        let router = Arc::new(EventRouter::new());

        let notifications = NotificationCenter::new_shared(options.retention_cap);
        notifications.register(router.as_ref());

        let side_effects = Arc::new(SideEffectDispatcher::new(
            SideEffectPorts {
                toaster: deps.toaster,
                sound: deps.sound,
                desktop: deps.desktop,
            },
            options.preferences,
        ));
        side_effects.register(router.as_ref());

        let history = deps.notifications_api.map(|api| HistorySync {
            api,
            token_provider: Arc::clone(&deps.token_provider),
            notifications: Arc::clone(&notifications),
            limit: options.history_limit,
        });
        if let Some(history) = &history {
            router.on(names::RECONNECT, Arc::new(history.clone()));
        }

        let connection =
            ConnectionManager::new(options.connection, deps.transport, Arc::clone(&router));

        tracing::debug!(
            url = %connection.settings().url,
            retention_cap = options.retention_cap,
            "Realtime client initialised"
        );

        Self {
            router,
            connection,
            notifications,
            side_effects,
            token_provider: deps.token_provider,
            history,
        }
    }

    /// Disconnects, drops every subscription and clears the ledger.
    pub fn teardown(&self) {
        self.connection.disconnect();
        self.router.clear();
        self.notifications.clear();
        tracing::debug!("Realtime client torn down");
    }

    /// Connects with the token the auth collaborator currently holds.
    ///
    /// When a REST API is configured the caller that opened the session
    /// refreshes the ledger from history afterwards; callers that joined it
    /// do not. A failed refresh is logged and does not fail the connect.
    pub async fn connect(&self) -> Result<(), ConnectError> {
        let token = self.token_provider.current_token().await;
        let outcome = self.connection.connect(token).await?;

        if outcome.opened_session() && self.history.is_some() {
            if let Err(e) = self.sync_history().await {
                tracing::warn!(error = %e, "History sync after connect failed");
            }
        }
        Ok(())
    }

    pub fn disconnect(&self) {
        self.connection.disconnect();
    }

    /// Manual recovery after a terminal failure: drop whatever is left and
    /// start a fresh session.
    pub async fn reconnect(&self) -> Result<(), ConnectError> {
        tracing::info!("Manual reconnect requested");
        self.connection.disconnect();
        self.connect().await
    }

    /// Marks one notification read locally and tells the server.
    ///
    /// Returns true if the local entry changed.
    pub fn mark_read(&self, id: NotificationId) -> bool {
        let changed = self.notifications.mark_read(id);
        self.connection.emit(OutboundCommand::MarkNotificationRead(id));
        changed
    }

    /// Marks every notification read locally and tells the server.
    pub fn mark_all_read(&self) -> usize {
        let changed = self.notifications.mark_all_read();
        self.connection.emit(OutboundCommand::MarkAllNotificationsRead);
        changed
    }

    /// Marks one notification read and persists it over REST.
    ///
    /// Falls back to the push command when no REST API is configured.
    pub async fn confirm_read(&self, id: NotificationId) -> Result<bool, ApiError> {
        let changed = self.notifications.mark_read(id);
        match &self.history {
            Some(history) => {
                let token = self
                    .token_provider
                    .current_token()
                    .await
                    .ok_or(ApiError::MissingToken)?;
                history.api.mark_read(&token, id).await?;
            }
            None => self.connection.emit(OutboundCommand::MarkNotificationRead(id)),
        }
        Ok(changed)
    }

    /// Empties the local ledger. Nothing is deleted server-side.
    pub fn clear_notifications(&self) {
        self.notifications.clear();
    }

    /// Applies preferences locally and pushes them to the server.
    pub fn update_preferences(&self, preferences: NotificationPreferences) {
        self.side_effects.set_preferences(preferences.clone());
        self.connection
            .emit(OutboundCommand::UpdateNotificationPreferences(preferences));
    }

    pub fn preferences(&self) -> NotificationPreferences {
        self.side_effects.preferences()
    }

    pub fn join_internship_updates(&self, id: InternshipId) {
        self.connection.emit(OutboundCommand::JoinInternshipUpdates(id));
    }

    pub fn leave_internship_updates(&self, id: InternshipId) {
        self.connection.emit(OutboundCommand::LeaveInternshipUpdates(id));
    }

    pub fn ping(&self) {
        self.connection.emit(OutboundCommand::Ping);
    }

    pub fn subscribe(&self, event_name: &str, handler: Arc<dyn EventHandler>) {
        self.router.on(event_name, handler);
    }

    /// Returns true if `handler` was registered under `event_name`.
    pub fn unsubscribe(&self, event_name: &str, handler: &Arc<dyn EventHandler>) -> bool {
        self.router.off(event_name, handler)
    }

    /// Direct access for closure subscriptions (`on_fn`).
    pub fn router(&self) -> &Arc<EventRouter> {
        &self.router
    }

    /// Newest-first copy of the ledger.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.snapshot()
    }

    /// Unread notifications, newest-first.
    pub fn unread_notifications(&self) -> Vec<Notification> {
        self.notifications.unread()
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.unread_count()
    }

    pub fn watch_unread(&self) -> watch::Receiver<usize> {
        self.notifications.watch_unread()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn watch_connection(&self) -> watch::Receiver<ConnectionState> {
        self.connection.watch()
    }

    /// Dismisses the terminal "reconnection failed" indicator.
    pub fn acknowledge_failure(&self) -> bool {
        self.connection.acknowledge_failure()
    }

    pub async fn request_desktop_permission(&self) -> DesktopPermission {
        self.side_effects.request_desktop_permission().await
    }

    /// Refreshes the ledger from REST history.
    ///
    /// Returns the number of history entries loaded, or 0 when no REST API
    /// is configured.
    pub async fn sync_history(&self) -> Result<usize, ApiError> {
        match &self.history {
            Some(history) => history.run().await,
            None => {
                tracing::debug!("History sync skipped: no REST API configured");
                Ok(0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{
        FakeDesktopNotifier, RecordingSoundPlayer, RecordingToaster, ScriptedTransport,
    };
    use crate::adapters::StaticTokenProvider;
    use crate::domain::foundation::UserId;
    use crate::domain::notification::NotificationType;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use secrecy::SecretString;
    use serde_json::json;
    use std::time::Duration;

    struct FakeApi {
        history: Mutex<Vec<Notification>>,
        fetches: Mutex<usize>,
        marked: Mutex<Vec<NotificationId>>,
    }

    impl FakeApi {
        fn new(history: Vec<Notification>) -> Arc<Self> {
            Arc::new(Self {
                history: Mutex::new(history),
                fetches: Mutex::new(0),
                marked: Mutex::new(Vec::new()),
            })
        }

        fn fetches(&self) -> usize {
            *self.fetches.lock()
        }
    }

    #[async_trait]
    impl NotificationsApi for FakeApi {
        async fn recent_notifications(
            &self,
            _token: &SecretString,
            limit: usize,
        ) -> Result<Vec<Notification>, ApiError> {
            *self.fetches.lock() += 1;
            Ok(self.history.lock().iter().take(limit).cloned().collect())
        }

        async fn mark_read(&self, _token: &SecretString, id: NotificationId) -> Result<(), ApiError> {
            self.marked.lock().push(id);
            Ok(())
        }
    }

    fn note(id: i64) -> Notification {
        Notification::new(
            NotificationId::new(id),
            UserId::new(1),
            NotificationType::NewMatch,
            "Match",
            "A new internship matches your profile",
        )
    }

    fn client_with(
        transport: Arc<ScriptedTransport>,
        token: Option<&str>,
        api: Option<Arc<dyn NotificationsApi>>,
    ) -> (RealtimeClient, Arc<RecordingToaster>) {
        let toaster = Arc::new(RecordingToaster::new());
        let deps = RealtimeDeps {
            transport,
            token_provider: Arc::new(StaticTokenProvider::new(
                token.map(|t| SecretString::new(t.to_string())),
            )),
            toaster: toaster.clone(),
            sound: Arc::new(RecordingSoundPlayer::new()),
            desktop: Arc::new(FakeDesktopNotifier::new(
                DesktopPermission::Default,
                DesktopPermission::Granted,
            )),
            notifications_api: api,
        };
        let options = RealtimeOptions::new("ws://test.invalid").with_connection(
            ConnectionSettings::new("ws://test.invalid")
                .with_handshake_timeout(Duration::from_millis(200))
                .with_reconnect_policy(2, Duration::from_millis(5)),
        );
        (RealtimeClient::init(options, deps), toaster)
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn connect_uses_token_from_provider() {
        let transport = Arc::new(ScriptedTransport::new());
        let (client, _) = client_with(transport.clone(), Some("jwt-1"), None);

        client.connect().await.unwrap();

        assert!(client.connection_state().connected);
        assert_eq!(transport.tokens(), vec!["jwt-1".to_string()]);
    }

    #[tokio::test]
    async fn signed_out_connect_is_rejected() {
        let transport = Arc::new(ScriptedTransport::new());
        let (client, _) = client_with(transport.clone(), None, None);

        assert_eq!(client.connect().await, Err(ConnectError::MissingToken));
        assert_eq!(transport.opens(), 0);
    }

    #[tokio::test]
    async fn pushed_notification_reaches_ledger_and_toast() {
        let transport = Arc::new(ScriptedTransport::new());
        let (client, toaster) = client_with(transport.clone(), Some("jwt"), None);
        client.connect().await.unwrap();

        transport.push_event("new_notification", serde_json::to_value(note(1)).unwrap());
        settle().await;

        assert_eq!(client.unread_count(), 1);
        assert_eq!(toaster.shown().len(), 1);
    }

    #[tokio::test]
    async fn server_read_echo_updates_ledger() {
        let transport = Arc::new(ScriptedTransport::new());
        let (client, _) = client_with(transport.clone(), Some("jwt"), None);
        client.connect().await.unwrap();

        transport.push_event("new_notification", serde_json::to_value(note(1)).unwrap());
        transport.push_event("new_notification", serde_json::to_value(note(2)).unwrap());
        transport.push_event("notification_read", json!({"notificationId": 2}));
        settle().await;
        assert_eq!(client.unread_count(), 1);

        transport.push_event("all_notifications_read", json!({}));
        settle().await;
        assert_eq!(client.unread_count(), 0);
    }

    #[tokio::test]
    async fn commands_are_encoded_on_the_wire() {
        let transport = Arc::new(ScriptedTransport::new());
        let (client, _) = client_with(transport.clone(), Some("jwt"), None);
        client.connect().await.unwrap();

        client.join_internship_updates(InternshipId::new(42));
        client.leave_internship_updates(InternshipId::new(42));
        client.update_preferences(NotificationPreferences::new(false, true));
        client.mark_all_read();

        let sent = transport.sent();
        let names: Vec<&str> = sent.iter().map(|f| f.event.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "join_internship_updates",
                "leave_internship_updates",
                "update_notification_preferences",
                "mark_all_notifications_read",
            ]
        );
        assert_eq!(sent[0].data["internshipId"], 42);
        assert_eq!(sent[2].data["enableSound"], false);
        assert!(!client.preferences().enable_sound);
    }

    #[tokio::test]
    async fn connect_syncs_history_when_api_configured() {
        let transport = Arc::new(ScriptedTransport::new());
        let api = FakeApi::new(vec![note(3), note(2).already_read(), note(1)]);
        let (client, toaster) = client_with(transport, Some("jwt"), Some(api.clone()));

        client.connect().await.unwrap();

        assert_eq!(client.notifications().len(), 3);
        assert_eq!(client.unread_count(), 2);
        // History does not replay side effects.
        assert!(toaster.shown().is_empty());

        assert!(client.confirm_read(NotificationId::new(3)).await.unwrap());
        assert_eq!(*api.marked.lock(), vec![NotificationId::new(3)]);
        assert_eq!(client.unread_count(), 1);
    }

    #[tokio::test]
    async fn concurrent_connects_sync_history_once() {
        let transport =
            Arc::new(ScriptedTransport::new().with_open_delay(Duration::from_millis(20)));
        let api = FakeApi::new(vec![note(1)]);
        let (client, _) = client_with(transport.clone(), Some("jwt"), Some(api.clone()));

        let (first, second) = tokio::join!(client.connect(), client.connect());
        assert!(first.is_ok() && second.is_ok());
        client.connect().await.unwrap();

        assert_eq!(transport.opens(), 1);
        assert_eq!(api.fetches(), 1);
        assert_eq!(client.notifications().len(), 1);
    }

    #[tokio::test]
    async fn automatic_reconnect_resyncs_history() {
        let transport = Arc::new(ScriptedTransport::new());
        let api = FakeApi::new(vec![note(1)]);
        let (client, _) = client_with(transport.clone(), Some("jwt"), Some(api.clone()));
        client.connect().await.unwrap();
        assert_eq!(api.fetches(), 1);

        // Pushed while the link was down.
        *api.history.lock() = vec![note(2), note(1)];
        let mut state = client.watch_connection();
        transport.close_link("server restart");
        tokio::time::timeout(
            Duration::from_secs(5),
            state.wait_for(|s| s.connected && s.session_id.as_deref() == Some("session-2")),
        )
        .await
        .unwrap()
        .unwrap();
        settle().await;

        assert_eq!(api.fetches(), 2);
        let ids: Vec<i64> = client.notifications().iter().map(|n| n.id.as_i64()).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(client.unread_notifications().len(), 2);
    }

    #[tokio::test]
    async fn failed_initial_connect_shows_error_toast() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.refuse_opens(true);
        let (client, toaster) = client_with(transport.clone(), Some("jwt"), None);

        assert!(matches!(client.connect().await, Err(ConnectError::Transport(_))));

        let toasts = toaster.shown();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].severity, crate::domain::alerts::ToastSeverity::Error);
        assert!(client.connection_state().last_error.is_some());
    }

    #[tokio::test]
    async fn sync_history_without_api_is_noop() {
        let transport = Arc::new(ScriptedTransport::new());
        let (client, _) = client_with(transport, Some("jwt"), None);
        assert_eq!(client.sync_history().await, Ok(0));
    }

    #[tokio::test]
    async fn manual_reconnect_recovers_from_failure() {
        let transport = Arc::new(ScriptedTransport::new());
        let (client, toaster) = client_with(transport.clone(), Some("jwt"), None);
        client.connect().await.unwrap();
        let mut state = client.watch_connection();

        transport.refuse_opens(true);
        transport.close_link("network down");
        tokio::time::timeout(
            Duration::from_secs(5),
            state.wait_for(|s| s.requires_acknowledgement()),
        )
        .await
        .unwrap()
        .unwrap();
        assert!(toaster.shown().iter().any(|t| t.persistent));

        transport.refuse_opens(false);
        client.reconnect().await.unwrap();

        let state = client.connection_state();
        assert!(state.connected);
        assert_eq!(state.reconnect_attempts, 0);
    }

    #[tokio::test]
    async fn teardown_disconnects_and_clears() {
        let transport = Arc::new(ScriptedTransport::new());
        let (client, _) = client_with(transport.clone(), Some("jwt"), None);
        client.connect().await.unwrap();
        transport.push_event("new_notification", serde_json::to_value(note(1)).unwrap());
        settle().await;

        client.teardown();

        assert!(!client.connection_state().connected);
        assert!(client.notifications().is_empty());
        assert_eq!(client.router().handler_count("new_notification"), 0);
    }
}
