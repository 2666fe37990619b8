//! WebSocket transport
//!
//! Each `open` spawns one tokio task that owns the socket. The task reports
//! everything it sees on a shared event channel and drains an unbounded
//! outbound queue. Releasing the handle drops the queue sender, which makes
//! the task send a close frame and exit on its own; nobody waits for it.

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::{ConnectionId, Transport, TransportEvent, TransportEventKind};

/// Channel capacity for events from socket tasks.
///
/// Socket tasks wait when the buffer is full, so a slow client applies
/// backpressure to the socket instead of dropping frames.
pub const TRANSPORT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// WebSocket implementation of [`Transport`]
///
/// Must be used from within a tokio runtime.
pub struct WsTransport {
    /// Shared sender handed to every socket task
    events: mpsc::Sender<TransportEvent>,
    /// The single live handle, if any
    active: Option<ActiveSocket>,
    /// Last connection ID handed out
    last_id: u64,
}

/// Handle to a running socket task
struct ActiveSocket {
    id: ConnectionId,
    outbound: mpsc::UnboundedSender<String>,
}

impl WsTransport {
    /// Create a transport reporting on `events`
    pub fn new(events: mpsc::Sender<TransportEvent>) -> Self {
        Self {
            events,
            active: None,
            last_id: 0,
        }
    }

    /// Create a transport together with the receiving end of its events
    pub fn channel() -> (Self, mpsc::Receiver<TransportEvent>) {
        let (tx, rx) = mpsc::channel(TRANSPORT_EVENT_CHANNEL_CAPACITY);
        (Self::new(tx), rx)
    }

    /// ID of the live handle, if any
    pub fn active_id(&self) -> Option<ConnectionId> {
        self.active.as_ref().map(|a| a.id)
    }
}

impl Transport for WsTransport {
    fn open(&mut self, url: &str) -> ConnectionId {
        self.close();

        self.last_id += 1;
        let id = ConnectionId::new(self.last_id);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        tracing::debug!(connection = %id, url = %url, "Opening WebSocket");
        tokio::spawn(run_socket(
            id,
            url.to_string(),
            outbound_rx,
            self.events.clone(),
        ));

        self.active = Some(ActiveSocket {
            id,
            outbound: outbound_tx,
        });
        id
    }

    fn send(&mut self, frame: String) {
        let Some(active) = &self.active else {
            tracing::trace!("No active connection, dropping outbound frame");
            return;
        };
        if active.outbound.send(frame).is_err() {
            tracing::debug!(connection = %active.id, "Socket task gone, dropping outbound frame");
        }
    }

    fn close(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::debug!(connection = %active.id, "Releasing WebSocket handle");
        }
    }

    fn is_open(&self) -> bool {
        self.active.is_some()
    }
}

/// Report an event; returns false once the client has gone away
async fn emit(
    events: &mpsc::Sender<TransportEvent>,
    connection: ConnectionId,
    kind: TransportEventKind,
) -> bool {
    events
        .send(TransportEvent::new(connection, kind))
        .await
        .is_ok()
}

/// Socket task: connect, then pump frames both ways until either side stops
async fn run_socket(
    id: ConnectionId,
    url: String,
    mut outbound: mpsc::UnboundedReceiver<String>,
    events: mpsc::Sender<TransportEvent>,
) {
    let socket = match connect_async(url.as_str()).await {
        Ok((socket, response)) => {
            tracing::debug!(connection = %id, status = %response.status(), "WebSocket handshake complete");
            socket
        }
        Err(e) => {
            emit(
                &events,
                id,
                TransportEventKind::Error(format!("failed to connect to {}: {}", url, e)),
            )
            .await;
            emit(&events, id, TransportEventKind::Closed).await;
            return;
        }
    };

    if !emit(&events, id, TransportEventKind::Open).await {
        return;
    }

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            outgoing = outbound.recv() => match outgoing {
                Some(frame) => {
                    if let Err(e) = sink.send(Message::text(frame)).await {
                        emit(&events, id, TransportEventKind::Error(format!("send failed: {}", e))).await;
                        break;
                    }
                }
                None => {
                    tracing::debug!(connection = %id, "Handle released, closing socket");
                    if let Err(e) = sink.send(Message::Close(None)).await {
                        tracing::debug!(connection = %id, "Close frame not sent: {}", e);
                    }
                    break;
                }
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if !emit(&events, id, TransportEventKind::Frame(text.as_str().to_owned())).await {
                        return;
                    }
                }
                Some(Ok(Message::Binary(data))) => {
                    let text = String::from_utf8_lossy(&data).into_owned();
                    if !emit(&events, id, TransportEventKind::Frame(text)).await {
                        return;
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::debug!(connection = %id, ?frame, "Peer closed connection");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    emit(&events, id, TransportEventKind::Error(e.to_string())).await;
                    break;
                }
                None => break,
            },
        }
    }

    emit(&events, id, TransportEventKind::Closed).await;
}
