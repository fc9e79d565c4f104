//! Scripted in-memory transport for driving the connection manager in tests.
//!
//! # Example
//!
//! ```ignore
//! let transport = Arc::new(ScriptedTransport::new());
//! manager.connect(token).await?;              // handshake sent automatically
//! transport.push_event("pong", json!({}));     // server -> client
//! transport.close_link("server restart");      // triggers reconnection
//! assert_eq!(transport.opens(), 2);
//! ```

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use crate::domain::connection::{names, WireFrame};
use crate::ports::{ConnectRequest, Transport, TransportError, TransportLink, TransportSignal};

/// In-memory transport whose server side is driven by the test.
///
/// Each successful `open` creates a fresh link and, unless built with
/// `without_handshake`, immediately sends `connected` with session id
/// `session-N` where N counts every open attempt.
#[derive(Debug)]
pub struct ScriptedTransport {
    auto_handshake: bool,
    open_delay: Mutex<Option<Duration>>,
    state: Mutex<ScriptState>,
}

#[derive(Debug, Default)]
struct ScriptState {
    opens: usize,
    refuse: bool,
    fail_next: usize,
    server_tx: Option<mpsc::UnboundedSender<TransportSignal>>,
    client_rx: Vec<mpsc::UnboundedReceiver<WireFrame>>,
    sent: Vec<WireFrame>,
    tokens: Vec<String>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            auto_handshake: true,
            open_delay: Mutex::new(None),
            state: Mutex::new(ScriptState::default()),
        }
    }

    /// Links open but the server never acknowledges the session.
    pub fn without_handshake(mut self) -> Self {
        self.auto_handshake = false;
        self
    }

    /// Makes every `open` take at least `delay`.
    pub fn with_open_delay(self, delay: Duration) -> Self {
        *self.open_delay.lock() = Some(delay);
        self
    }

    /// Refuses every subsequent open until switched off.
    pub fn refuse_opens(&self, refuse: bool) {
        self.state.lock().refuse = refuse;
    }

    /// Refuses the next `count` opens.
    pub fn fail_next_opens(&self, count: usize) {
        self.state.lock().fail_next = count;
    }

    /// Number of `open` calls, including refused ones.
    pub fn opens(&self) -> usize {
        self.state.lock().opens
    }

    /// Bearer tokens presented to `open`, in order.
    pub fn tokens(&self) -> Vec<String> {
        self.state.lock().tokens.clone()
    }

    /// Waits until `open` has been called at least `count` times.
    pub async fn wait_for_opens(&self, count: usize) {
        while self.opens() < count {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    /// Sends a frame from the server on the current link.
    pub fn push(&self, frame: WireFrame) -> bool {
        let state = self.state.lock();
        match &state.server_tx {
            Some(tx) => tx.send(TransportSignal::Frame(frame)).is_ok(),
            None => false,
        }
    }

    pub fn push_event(&self, event: &str, data: Value) -> bool {
        self.push(WireFrame::new(event, data))
    }

    /// Sends a raw closed signal and drops the server side of the link.
    pub fn close_link(&self, reason: &str) {
        if let Some(tx) = self.state.lock().server_tx.take() {
            let _ = tx.send(TransportSignal::Closed {
                reason: reason.to_string(),
            });
        }
    }

    /// Every frame the client wrote, across all links.
    pub fn sent(&self) -> Vec<WireFrame> {
        let mut state = self.state.lock();
        let ScriptState { client_rx, sent, .. } = &mut *state;
        for rx in client_rx.iter_mut() {
            while let Ok(frame) = rx.try_recv() {
                sent.push(frame);
            }
        }
        sent.clone()
    }

    /// Frames the client wrote under `event`.
    pub fn sent_named(&self, event: &str) -> Vec<WireFrame> {
        self.sent().into_iter().filter(|f| f.event == event).collect()
    }
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn open(&self, request: &ConnectRequest) -> Result<TransportLink, TransportError> {
        use secrecy::ExposeSecret;

        let session = {
            let mut state = self.state.lock();
            state.opens += 1;
            state.tokens.push(request.token.expose_secret().clone());
            state.opens
        };

        let delay = *self.open_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock();
        if state.refuse || state.fail_next > 0 {
            state.fail_next = state.fail_next.saturating_sub(1);
            return Err(TransportError::Refused(format!("{} unreachable", request.url)));
        }

        let (server_tx, inbound) = mpsc::unbounded_channel();
        let (outbound, client_rx) = mpsc::unbounded_channel();

        if self.auto_handshake {
            let _ = server_tx.send(TransportSignal::Frame(WireFrame::new(
                names::CONNECTED,
                json!({ "timestamp": 0, "sessionId": format!("session-{session}") }),
            )));
        }

        state.server_tx = Some(server_tx);
        state.client_rx.push(client_rx);
        Ok(TransportLink { outbound, inbound })
    }
}
