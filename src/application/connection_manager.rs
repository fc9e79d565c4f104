//! ConnectionManager - owns the single push session and its lifecycle.
//!
//! # Responsibilities
//!
//! - Open one transport link per logical session and wait for the
//!   application-level `connected` handshake.
//! - Share a pending `connect()` between concurrent callers.
//! - Forward decoded inbound frames to the router in wire order.
//! - Report a failed initial connect to subscribers as `connect_error`.
//! - Reconnect a lost session with a bounded number of fixed-delay
//!   attempts, then surface a terminal failure.
//! - Drop outbound commands while offline.
//!
//! A monotonically increasing generation number identifies the current
//! session. `disconnect()` and every new `connect()` bump it, which
//! cancels any pending handshake and stops an older session task.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{mpsc, watch, Notify};
use tokio::task::JoinHandle;

use crate::application::EventRouter;
use crate::domain::connection::{
    ConnectError, ConnectionState, ConnectionStatus, Handshake, OutboundCommand, RealtimeEvent,
    WireFrame,
};
use crate::ports::{ConnectRequest, Transport, TransportSignal};

/// Default handshake deadline.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);
/// Default reconnection bound.
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;
/// Default pause before each reconnection attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(1000);

/// Tunables for the connection manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub url: String,
    pub handshake_timeout: Duration,
    pub max_reconnect_attempts: u32,
    pub reconnect_delay: Duration,
}

impl ConnectionSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }

    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    pub fn with_reconnect_policy(mut self, max_attempts: u32, delay: Duration) -> Self {
        self.max_reconnect_attempts = max_attempts;
        self.reconnect_delay = delay;
        self
    }
}

/// How a successful `connect()` call was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// This call opened the session.
    Established,
    /// This call joined an attempt another caller started.
    Joined,
    /// A session was already live.
    AlreadyConnected,
}

impl ConnectOutcome {
    /// True only for the caller that opened the session.
    pub fn opened_session(self) -> bool {
        self == ConnectOutcome::Established
    }
}

type PendingConnect = Shared<BoxFuture<'static, Result<(), ConnectError>>>;

/// A link whose handshake completed, plus any frames that preceded it.
struct EstablishedLink {
    outbound: mpsc::UnboundedSender<WireFrame>,
    inbound: mpsc::UnboundedReceiver<TransportSignal>,
    handshake: Handshake,
    early: Vec<RealtimeEvent>,
}

/// Cloneable handle to the process-wide connection.
#[derive(Clone)]
pub struct ConnectionManager {
    inner: Arc<Inner>,
}

struct Inner {
    settings: ConnectionSettings,
    transport: Arc<dyn Transport>,
    router: Arc<EventRouter>,
    state_tx: watch::Sender<ConnectionState>,
    generation: AtomicU64,
    cancel: Notify,
    pending: Mutex<Option<(u64, PendingConnect)>>,
    outbound: Mutex<Option<mpsc::UnboundedSender<WireFrame>>>,
    session_task: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionManager {
    pub fn new(
        settings: ConnectionSettings,
        transport: Arc<dyn Transport>,
        router: Arc<EventRouter>,
    ) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::new());
        Self {
            inner: Arc::new(Inner {
                settings,
                transport,
                router,
                state_tx,
                generation: AtomicU64::new(0),
                cancel: Notify::new(),
                pending: Mutex::new(None),
                outbound: Mutex::new(None),
                session_task: Mutex::new(None),
            }),
        }
    }

    /// Opens a session authenticated with `token`.
    ///
    /// Resolves once the server's `connected` handshake arrives. Already
    /// connected: resolves immediately. Already connecting: joins the
    /// pending attempt instead of opening a second link. The outcome tells
    /// which of these happened.
    pub async fn connect(&self, token: Option<SecretString>) -> Result<ConnectOutcome, ConnectError> {
        let token = token
            .filter(|t| !t.expose_secret().trim().is_empty())
            .ok_or(ConnectError::MissingToken)?;

        let (pending, outcome) = {
            let mut pending = self.inner.pending.lock();
            if let Some((_, shared)) = pending.as_ref() {
                tracing::debug!("Joining pending connect");
                (shared.clone(), ConnectOutcome::Joined)
            } else if self.inner.state_tx.borrow().connected {
                return Ok(ConnectOutcome::AlreadyConnected);
            } else {
                let generation = self.inner.begin_generation();
                self.inner.stop_session_task();
                self.inner.update_state(|s| s.mark_connecting());

                let inner = Arc::clone(&self.inner);
                let shared = async move { inner.establish(token, generation).await }
                    .boxed()
                    .shared();
                *pending = Some((generation, shared.clone()));
                (shared, ConnectOutcome::Established)
            }
        };

        pending.await.map(|()| outcome)
    }

    /// Tears the session down. Idempotent.
    ///
    /// Cancels a pending connect and any running reconnection loop, and
    /// flips the state to disconnected before returning.
    pub fn disconnect(&self) {
        let inner = &self.inner;
        inner.begin_generation();
        inner.cancel.notify_waiters();
        inner.pending.lock().take();
        inner.outbound.lock().take();
        inner.stop_session_task();

        let was_connected = inner.state_tx.borrow().connected;
        let was_idle = inner.state_tx.borrow().status == ConnectionStatus::Disconnected;
        inner.update_state(|s| s.mark_disconnected(None));

        if was_idle {
            return;
        }
        tracing::info!("Disconnected by client");
        if was_connected {
            inner.router.dispatch(&RealtimeEvent::Disconnected {
                reason: "client disconnect".to_string(),
            });
        }
    }

    /// Fire-and-forget send. Dropped with a warning when offline.
    pub fn emit(&self, command: OutboundCommand) {
        let connected = self.inner.state_tx.borrow().connected;
        let outbound = self.inner.outbound.lock();
        match outbound.as_ref() {
            Some(tx) if connected => {
                if tx.send(command.to_frame()).is_err() {
                    tracing::warn!(command = command.name(), "Link closed; outbound command dropped");
                } else {
                    tracing::trace!(command = command.name(), "Outbound command sent");
                }
            }
            _ => {
                tracing::warn!(command = command.name(), "Not connected; outbound command dropped");
            }
        }
    }

    /// Clears a terminal failure after the user has seen it.
    pub fn acknowledge_failure(&self) -> bool {
        let mut acknowledged = false;
        self.inner.state_tx.send_if_modified(|s| {
            acknowledged = s.acknowledge_failure();
            acknowledged
        });
        acknowledged
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.state_tx.borrow().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.state_tx.borrow().connected
    }

    /// Reactive view of the connection state.
    pub fn watch(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state_tx.subscribe()
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.inner.settings
    }
}

impl Inner {
    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn begin_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn update_state(&self, f: impl FnOnce(&mut ConnectionState)) {
        self.state_tx.send_modify(f);
    }

    fn stop_session_task(&self) {
        if let Some(task) = self.session_task.lock().take() {
            task.abort();
        }
    }

    fn clear_pending(&self, generation: u64) {
        let mut pending = self.pending.lock();
        if matches!(pending.as_ref(), Some((g, _)) if *g == generation) {
            pending.take();
        }
    }

    fn request(&self, token: &SecretString) -> ConnectRequest {
        ConnectRequest {
            url: self.settings.url.clone(),
            token: token.clone(),
        }
    }

    async fn establish(self: Arc<Self>, token: SecretString, generation: u64) -> Result<(), ConnectError> {
        let cancelled = self.cancel.notified();
        tokio::pin!(cancelled);

        let request = self.request(&token);
        let outcome = if self.current_generation() != generation {
            Err(ConnectError::Cancelled)
        } else {
            tracing::info!(url = %self.settings.url, "Connecting");
            tokio::select! {
                _ = &mut cancelled => Err(ConnectError::Cancelled),
                result = self.open_session(&request) => result,
            }
        };

        let outcome = match outcome {
            Ok(_) if self.current_generation() != generation => Err(ConnectError::Cancelled),
            other => other,
        };

        match outcome {
            Ok(link) => {
                tracing::info!(session_id = ?link.handshake.session_id, "Session established");
                *self.outbound.lock() = Some(link.outbound);
                self.update_state(|s| s.mark_connected(link.handshake.session_id.clone()));
                self.clear_pending(generation);

                let task = tokio::spawn(Arc::clone(&self).run_session(link.inbound, token, generation));
                if let Some(old) = self.session_task.lock().replace(task) {
                    old.abort();
                }

                self.router.dispatch(&RealtimeEvent::Connected(link.handshake));
                for event in &link.early {
                    self.router.dispatch(event);
                }
                Ok(())
            }
            Err(e) => {
                if self.current_generation() == generation {
                    tracing::warn!(error = %e, "Connect failed");
                    let error = e.to_string();
                    self.update_state(|s| s.mark_disconnected(Some(error.clone())));
                    self.clear_pending(generation);
                    self.router.dispatch(&RealtimeEvent::ConnectError { error });
                } else {
                    tracing::debug!(error = %e, "Superseded connect attempt finished");
                }
                Err(e)
            }
        }
    }

    /// Opens a link and waits for the server handshake.
    async fn open_session(&self, request: &ConnectRequest) -> Result<EstablishedLink, ConnectError> {
        let link = self
            .transport
            .open(request)
            .await
            .map_err(|e| ConnectError::Transport(e.to_string()))?;

        let mut inbound = link.inbound;
        let timeout = self.settings.handshake_timeout;
        let (handshake, early) = tokio::time::timeout(timeout, await_handshake(&mut inbound))
            .await
            .map_err(|_| ConnectError::HandshakeTimeout {
                timeout_ms: timeout.as_millis() as u64,
            })??;

        Ok(EstablishedLink {
            outbound: link.outbound,
            inbound,
            handshake,
            early,
        })
    }

    async fn run_session(
        self: Arc<Self>,
        mut inbound: mpsc::UnboundedReceiver<TransportSignal>,
        token: SecretString,
        generation: u64,
    ) {
        loop {
            let reason = self.pump(&mut inbound, generation).await;
            if self.current_generation() != generation {
                return;
            }

            tracing::warn!(%reason, "Connection lost");
            self.outbound.lock().take();
            self.update_state(|s| s.mark_disconnected(Some(reason.clone())));
            self.router.dispatch(&RealtimeEvent::Disconnected { reason });

            match self.reconnect(&token, generation).await {
                Some(next) => inbound = next,
                None => return,
            }
        }
    }

    /// Routes inbound frames until the link ends; returns the close reason.
    async fn pump(
        &self,
        inbound: &mut mpsc::UnboundedReceiver<TransportSignal>,
        generation: u64,
    ) -> String {
        while let Some(signal) = inbound.recv().await {
            if self.current_generation() != generation {
                return "superseded".to_string();
            }
            match signal {
                TransportSignal::Frame(frame) => {
                    let name = frame.event.clone();
                    match RealtimeEvent::decode(frame) {
                        Ok(event) => {
                            if let RealtimeEvent::Connected(handshake) = &event {
                                self.update_state(|s| s.session_id = handshake.session_id.clone());
                            }
                            tracing::trace!(event = %name, "Inbound event");
                            self.router.dispatch(&event);
                        }
                        Err(e) => {
                            tracing::warn!(event = %name, error = %e, "Dropping malformed frame");
                        }
                    }
                }
                TransportSignal::Closed { reason } => return reason,
            }
        }
        "transport closed".to_string()
    }

    /// Bounded fixed-delay reconnection. Returns the new inbound stream,
    /// or `None` when the attempts are exhausted or the session was
    /// superseded.
    async fn reconnect(
        &self,
        token: &SecretString,
        generation: u64,
    ) -> Option<mpsc::UnboundedReceiver<TransportSignal>> {
        let max_attempts = self.settings.max_reconnect_attempts;
        let request = self.request(token);

        for attempt in 1..=max_attempts {
            self.update_state(|s| s.mark_reconnecting());
            tokio::time::sleep(self.settings.reconnect_delay).await;
            if self.current_generation() != generation {
                return None;
            }

            tracing::info!(attempt, max_attempts, "Reconnecting");
            match self.open_session(&request).await {
                Ok(link) => {
                    if self.current_generation() != generation {
                        return None;
                    }
                    tracing::info!(attempt, session_id = ?link.handshake.session_id, "Reconnected");
                    *self.outbound.lock() = Some(link.outbound);
                    self.update_state(|s| s.mark_connected(link.handshake.session_id.clone()));
                    self.router.dispatch(&RealtimeEvent::Reconnected {
                        attempt_number: attempt,
                    });
                    for event in &link.early {
                        self.router.dispatch(event);
                    }
                    return Some(link.inbound);
                }
                Err(e) => {
                    if self.current_generation() != generation {
                        return None;
                    }
                    let error = e.to_string();
                    self.update_state(|s| {
                        s.record_failed_attempt(error.clone());
                    });
                    let attempts = self.state_tx.borrow().reconnect_attempts;
                    tracing::warn!(attempt = attempts, error = %error, "Reconnect attempt failed");
                    self.router.dispatch(&RealtimeEvent::ReconnectError {
                        attempt: attempts,
                        error,
                    });
                }
            }
        }

        tracing::error!(attempts = max_attempts, "Giving up on reconnection");
        self.update_state(|s| {
            s.mark_failed(format!("Reconnection failed after {max_attempts} attempts"))
        });
        self.router.dispatch(&RealtimeEvent::ReconnectFailed {
            attempts: max_attempts,
        });
        None
    }
}

/// Reads until the `connected` frame, keeping domain events that arrive
/// before it so they can be routed afterwards in wire order.
async fn await_handshake(
    inbound: &mut mpsc::UnboundedReceiver<TransportSignal>,
) -> Result<(Handshake, Vec<RealtimeEvent>), ConnectError> {
    let mut early = Vec::new();
    loop {
        match inbound.recv().await {
            Some(TransportSignal::Frame(frame)) => {
                let name = frame.event.clone();
                match RealtimeEvent::decode(frame) {
                    Ok(RealtimeEvent::Connected(handshake)) => return Ok((handshake, early)),
                    Ok(event) => early.push(event),
                    Err(e) => {
                        tracing::warn!(event = %name, error = %e, "Dropping malformed frame");
                    }
                }
            }
            Some(TransportSignal::Closed { reason }) => {
                return Err(ConnectError::ClosedDuringHandshake(reason));
            }
            None => {
                return Err(ConnectError::ClosedDuringHandshake(
                    "transport closed".to_string(),
                ));
            }
        }
    }
}
