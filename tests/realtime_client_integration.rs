//! Integration tests for the realtime client.
//!
//! These tests drive a full `RealtimeClient` over the scripted in-memory
//! transport:
//! 1. Concurrent connects share one transport session; a refused first
//!    connect is surfaced once as an error toast
//! 2. A pushed notification lands in the ledger and can be marked read
//! 3. Exhausted reconnection surfaces a terminal failure
//! 4. Commands issued while offline are dropped silently
//! 5. A failing subscriber does not starve the others

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;

use internship_realtime::adapters::mock::{
    FakeDesktopNotifier, RecordingSoundPlayer, RecordingToaster, ScriptedTransport,
};
use internship_realtime::adapters::StaticTokenProvider;
use internship_realtime::application::{
    ConnectionSettings, RealtimeClient, RealtimeDeps, RealtimeOptions,
};
use internship_realtime::domain::alerts::{DesktopPermission, ToastSeverity};
use internship_realtime::domain::connection::{ConnectError, ConnectionStatus, RealtimeEvent};
use internship_realtime::domain::foundation::{DomainError, ErrorCode, NotificationId};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Harness {
    client: RealtimeClient,
    transport: Arc<ScriptedTransport>,
    toaster: Arc<RecordingToaster>,
}

fn harness(transport: ScriptedTransport, max_attempts: u32) -> Harness {
    let transport = Arc::new(transport);
    let toaster = Arc::new(RecordingToaster::new());
    let deps = RealtimeDeps {
        transport: transport.clone(),
        token_provider: Arc::new(StaticTokenProvider::new(Some(SecretString::new(
            "integration-token".to_string(),
        )))),
        toaster: toaster.clone(),
        sound: Arc::new(RecordingSoundPlayer::new()),
        desktop: Arc::new(FakeDesktopNotifier::new(
            DesktopPermission::Default,
            DesktopPermission::Denied,
        )),
        notifications_api: None,
    };
    let settings = ConnectionSettings::new("ws://push.test/socket")
        .with_handshake_timeout(Duration::from_millis(150))
        .with_reconnect_policy(max_attempts, Duration::from_millis(5));
    let client = RealtimeClient::init(
        RealtimeOptions::new("ws://push.test/socket").with_connection(settings),
        deps,
    );
    Harness {
        client,
        transport,
        toaster,
    }
}

/// Lets the session task drain what the transport pushed.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

// =============================================================================
// Idempotent connect
// =============================================================================

#[tokio::test]
async fn concurrent_connects_create_one_session() {
    let h = harness(
        ScriptedTransport::new().with_open_delay(Duration::from_millis(30)),
        5,
    );

    let (first, second) = tokio::join!(h.client.connect(), h.client.connect());

    assert!(first.is_ok());
    assert!(second.is_ok());
    assert_eq!(h.transport.opens(), 1);
    assert!(h.client.connection_state().connected);
}

#[tokio::test]
async fn concurrent_connects_reject_together_on_handshake_timeout() {
    let h = harness(ScriptedTransport::new().without_handshake(), 5);

    let (first, second) = tokio::join!(h.client.connect(), h.client.connect());

    let expected = Err(ConnectError::HandshakeTimeout { timeout_ms: 150 });
    assert_eq!(first, expected);
    assert_eq!(second, expected);
    assert_eq!(h.transport.opens(), 1);

    let state = h.client.connection_state();
    assert!(!state.connected);
    assert_eq!(state.reconnect_attempts, 0);
}

#[tokio::test]
async fn refused_first_connect_surfaces_error_toast() {
    let h = harness(
        ScriptedTransport::new().with_open_delay(Duration::from_millis(20)),
        5,
    );
    h.transport.refuse_opens(true);
    let reported = Arc::new(AtomicUsize::new(0));
    {
        let reported = Arc::clone(&reported);
        h.client.router().on_fn("connect_error", "Counter", move |event| {
            assert!(matches!(event, RealtimeEvent::ConnectError { .. }));
            reported.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
    }

    let (first, second) = tokio::join!(h.client.connect(), h.client.connect());

    assert!(matches!(first, Err(ConnectError::Transport(_))));
    assert_eq!(first, second);
    assert_eq!(reported.load(Ordering::SeqCst), 1);

    let toasts = h.toaster.shown();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].severity, ToastSeverity::Error);

    // No reconnection loop after a failed first connect.
    settle().await;
    assert_eq!(h.transport.opens(), 1);
    assert_eq!(h.client.connection_state().status, ConnectionStatus::Disconnected);
}

// =============================================================================
// End-to-end notification flow
// =============================================================================

#[tokio::test]
async fn new_notification_then_mark_read() {
    let h = harness(ScriptedTransport::new(), 5);
    h.client.connect().await.unwrap();

    h.transport.push_event(
        "new_notification",
        json!({
            "id": 1,
            "userId": 7,
            "type": "new_match",
            "title": "New match",
            "message": "Backend Intern at Ferrous matches your profile",
            "isRead": false,
            "sentAt": "2025-01-15T09:30:00Z",
            "deliveryMethod": "websocket",
            "metadata": {"score": 0.92}
        }),
    );
    settle().await;

    assert_eq!(h.client.notifications().len(), 1);
    assert_eq!(h.client.unread_count(), 1);
    let toasts = h.toaster.shown();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].severity, ToastSeverity::Success);

    assert!(h.client.mark_read(NotificationId::new(1)));

    assert_eq!(h.client.unread_count(), 0);
    assert!(h.client.notifications()[0].is_read);
    let sent = h.transport.sent_named("mark_notification_read");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].data["notificationId"], 1);
}

#[tokio::test]
async fn events_are_delivered_in_wire_order() {
    let h = harness(ScriptedTransport::new(), 5);
    h.client.connect().await.unwrap();

    for id in 1..=20 {
        h.transport.push_event(
            "new_notification",
            json!({
                "id": id,
                "userId": 1,
                "type": "status_change",
                "title": "Status",
                "message": "Updated",
                "sentAt": "2025-01-15T09:30:00Z"
            }),
        );
    }
    settle().await;

    let ids: Vec<i64> = h.client.notifications().iter().map(|n| n.id.as_i64()).collect();
    let expected: Vec<i64> = (1..=20).rev().collect();
    assert_eq!(ids, expected);
    assert_eq!(h.client.unread_count(), 20);
}

// =============================================================================
// Reconnection
// =============================================================================

#[tokio::test]
async fn five_reconnect_errors_surface_terminal_failure() {
    let h = harness(ScriptedTransport::new(), 5);
    let errors = Arc::new(AtomicUsize::new(0));
    {
        let errors = Arc::clone(&errors);
        h.client.router().on_fn("reconnect_error", "ErrorCounter", move |_| {
            errors.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
    }
    h.client.connect().await.unwrap();
    let mut state = h.client.watch_connection();

    h.transport.refuse_opens(true);
    h.transport.close_link("network unreachable");

    let failed = tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| s.status == ConnectionStatus::Failed),
    )
    .await
    .expect("reconnection never gave up")
    .expect("state channel closed")
    .clone();

    assert!(!failed.connected);
    assert_eq!(failed.reconnect_attempts, 5);
    assert_eq!(errors.load(Ordering::SeqCst), 5);

    // No silent retries after giving up.
    settle().await;
    assert_eq!(h.transport.opens(), 6);

    let toasts = h.toaster.shown();
    assert!(toasts
        .iter()
        .any(|t| t.severity == ToastSeverity::Error && t.persistent));
    assert_eq!(
        toasts
            .iter()
            .filter(|t| t.severity == ToastSeverity::Warning)
            .count(),
        1
    );
}

// =============================================================================
// Offline commands
// =============================================================================

#[tokio::test]
async fn ping_while_disconnected_sends_nothing() {
    let h = harness(ScriptedTransport::new(), 5);

    h.client.ping();
    h.client.mark_all_read();

    assert!(h.transport.sent().is_empty());
    assert_eq!(h.transport.opens(), 0);
}

#[tokio::test]
async fn commands_after_disconnect_are_not_replayed() {
    let h = harness(ScriptedTransport::new(), 5);
    h.client.connect().await.unwrap();
    h.client.disconnect();

    h.client.ping();
    h.client.connect().await.unwrap();

    assert!(h.transport.sent_named("ping").is_empty());
    assert_eq!(h.transport.opens(), 2);
}

// =============================================================================
// Fault isolation
// =============================================================================

#[tokio::test]
async fn failing_subscriber_does_not_starve_others() {
    let h = harness(ScriptedTransport::new(), 5);
    let received = Arc::new(AtomicUsize::new(0));

    h.client.router().on_fn("pong", "Exploder", |_| panic!("subscriber blew up"));
    h.client.router().on_fn("pong", "Rejecter", |_| {
        Err(DomainError::new(ErrorCode::InternalError, "nope"))
    });
    {
        let received = Arc::clone(&received);
        h.client.router().on_fn("pong", "Counter", move |event| {
            assert!(matches!(event, RealtimeEvent::Pong(_)));
            received.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
    }
    h.client.connect().await.unwrap();

    h.transport.push_event("pong", json!({"timestamp": 1}));
    h.transport.push_event("pong", json!({"timestamp": 2}));
    settle().await;

    assert_eq!(received.load(Ordering::SeqCst), 2);
    assert!(h.client.connection_state().connected);
}
