//! tokio-tungstenite implementation of the `Transport` port.

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use secrecy::ExposeSecret;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::Instrument;
use uuid::Uuid;

use crate::domain::connection::WireFrame;
use crate::ports::{ConnectRequest, Transport, TransportError, TransportLink, TransportSignal};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens authenticated WebSocket links.
///
/// The bearer token travels in the `Authorization` header of the upgrade
/// request.
#[derive(Debug, Default, Clone)]
pub struct TungsteniteTransport;

impl TungsteniteTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for TungsteniteTransport {
    async fn open(&self, request: &ConnectRequest) -> Result<TransportLink, TransportError> {
        let mut upgrade = request
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| TransportError::InvalidEndpoint(e.to_string()))?;

        let bearer = HeaderValue::from_str(&format!("Bearer {}", request.token.expose_secret()))
            .map_err(|_| TransportError::Unauthorized("token is not a valid header value".into()))?;
        upgrade.headers_mut().insert("Authorization", bearer);

        let (socket, _response) = connect_async(upgrade).await.map_err(map_connect_error)?;

        let link_id = Uuid::new_v4();
        tracing::debug!(%link_id, url = %request.url, "WebSocket open");

        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound) = mpsc::unbounded_channel();
        let span = tracing::debug_span!("ws_link", %link_id);
        tokio::spawn(run_link(socket, outbound_rx, inbound_tx).instrument(span));

        Ok(TransportLink { outbound, inbound })
    }
}

fn map_connect_error(err: WsError) -> TransportError {
    match err {
        WsError::Url(e) => TransportError::InvalidEndpoint(e.to_string()),
        WsError::Http(response) => {
            let status = response.status();
            if status.as_u16() == 401 || status.as_u16() == 403 {
                TransportError::Unauthorized(format!("upgrade rejected with {status}"))
            } else {
                TransportError::Refused(format!("upgrade failed with {status}"))
            }
        }
        other => TransportError::Refused(other.to_string()),
    }
}

/// Drives one socket until either side ends it.
async fn run_link(
    socket: Socket,
    outbound_rx: mpsc::UnboundedReceiver<WireFrame>,
    inbound_tx: mpsc::UnboundedSender<TransportSignal>,
) {
    let (sink, stream) = socket.split();

    let mut send_task = tokio::spawn(send_frames(sink, outbound_rx).in_current_span());
    let mut recv_task = tokio::spawn(recv_frames(stream, inbound_tx.clone()).in_current_span());

    let reason = tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
            "closed by client".to_string()
        }
        result = &mut recv_task => {
            send_task.abort();
            result.unwrap_or_else(|e| format!("receive task failed: {e}"))
        }
    };

    tracing::debug!(%reason, "WebSocket closed");
    let _ = inbound_tx.send(TransportSignal::Closed { reason });
}

async fn send_frames(
    mut sink: SplitSink<Socket, Message>,
    mut outbound_rx: mpsc::UnboundedReceiver<WireFrame>,
) {
    while let Some(frame) = outbound_rx.recv().await {
        if let Err(e) = sink.send(Message::Text(frame.to_text().into())).await {
            tracing::debug!(event = %frame.event, "Send error, closing link: {}", e);
            return;
        }
    }
    // Manager dropped the link.
    let _ = sink.close().await;
}

/// Forwards frames until the server closes; returns the close reason.
async fn recv_frames(
    mut stream: SplitStream<Socket>,
    inbound_tx: mpsc::UnboundedSender<TransportSignal>,
) -> String {
    while let Some(result) = stream.next().await {
        match result {
            Ok(message) => match classify(message) {
                Inbound::Frame(frame) => {
                    if inbound_tx.send(TransportSignal::Frame(frame)).is_err() {
                        return "link dropped by client".to_string();
                    }
                }
                Inbound::Ignore => {}
                Inbound::Close(reason) => return reason,
            },
            Err(e) => return e.to_string(),
        }
    }
    "stream ended".to_string()
}

#[derive(Debug, PartialEq)]
enum Inbound {
    Frame(WireFrame),
    Ignore,
    Close(String),
}

fn classify(message: Message) -> Inbound {
    match message {
        Message::Text(text) => match WireFrame::from_text(text.as_str()) {
            Ok(frame) => Inbound::Frame(frame),
            Err(e) => {
                tracing::warn!(error = %e, "Dropping malformed frame");
                Inbound::Ignore
            }
        },
        Message::Binary(_) => {
            tracing::warn!("Received unsupported binary message");
            Inbound::Ignore
        }
        // Protocol-level ping/pong is answered by tungstenite.
        Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => Inbound::Ignore,
        Message::Close(frame) => Inbound::Close(
            frame
                .map(|f| format!("{} {}", u16::from(f.code), f.reason.as_str()).trim().to_string())
                .unwrap_or_else(|| "closed by server".to_string()),
        ),
    }
}
