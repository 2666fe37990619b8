//! Single-writer client runtime
//!
//! All client state lives on one tokio task. Callers talk to it through a
//! cloneable [`ClientHandle`]; commands and transport events are applied one
//! at a time in arrival order, so no lock guards the state.

use tokio::sync::{broadcast, mpsc, oneshot};

use gl_core::config::ClientConfig;
use gl_core::{ClientError, ConnectionState, HostEvent, PromptState};
use gl_protocol::ServerMessage;

use crate::client::ProtocolClient;
use crate::transport::{Transport, TransportEvent, WsTransport};

/// Capacity of the command queue feeding the client task
const COMMAND_CHANNEL_CAPACITY: usize = 64;

/// Commands accepted by the client task
enum Command {
    Connect(String),
    AuthRequest(String),
    AuthResponse(String),
    StartSession {
        env: String,
        cmd: String,
        reply: oneshot::Sender<Result<(), ClientError>>,
    },
    Disconnect,
    ClearLogs,
    Snapshot(oneshot::Sender<ClientSnapshot>),
    Shutdown,
}

/// A host event as delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub struct ClientEvent {
    /// Which notification was raised
    pub kind: HostEvent,
    /// The frame behind a `Message` event; `None` for the others
    pub message: Option<ServerMessage>,
}

/// Every reporter value at one instant
#[derive(Debug, Clone)]
pub struct ClientSnapshot {
    pub connected: bool,
    pub loading: bool,
    pub state: ConnectionState,
    pub prompt: PromptState,
    /// Rendered log, oldest first
    pub logs: String,
    pub last_message: Option<ServerMessage>,
}

impl ClientSnapshot {
    fn capture<T: Transport>(client: &ProtocolClient<T>) -> Self {
        Self {
            connected: client.is_connected(),
            loading: client.is_loading(),
            state: client.state(),
            prompt: client.prompt_state().clone(),
            logs: client.logs(),
            last_message: client.last_message().cloned(),
        }
    }

    /// Session state as reported to hosts
    pub fn session_state(&self) -> &'static str {
        self.state.as_str()
    }
}

/// Cloneable handle to a running client task
#[derive(Clone)]
pub struct ClientHandle {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<ClientEvent>,
}

impl ClientHandle {
    /// Spawn a client using the WebSocket transport
    pub fn spawn(config: &ClientConfig) -> Self {
        let (transport, transport_events) = WsTransport::channel();
        Self::spawn_with(transport, transport_events, config)
    }

    /// Spawn a client over any transport reporting on `transport_events`
    pub fn spawn_with<T>(
        transport: T,
        transport_events: mpsc::Receiver<TransportEvent>,
        config: &ClientConfig,
    ) -> Self
    where
        T: Transport + Send + 'static,
    {
        let (events_tx, _) = broadcast::channel(config.event_capacity.max(1));
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);

        let mut client = ProtocolClient::new(transport, config.log_capacity);
        let (raised_tx, raised_rx) = mpsc::unbounded_channel();
        client.hooks_mut().on_any(move |event| {
            let _ = raised_tx.send(event);
        });

        tokio::spawn(run_client(
            client,
            commands_rx,
            transport_events,
            raised_rx,
            events_tx.clone(),
        ));

        Self {
            commands: commands_tx,
            events: events_tx,
        }
    }

    /// Receive host events raised from now on
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Open a connection, replacing any existing one
    pub async fn connect(&self, url: impl Into<String>) -> Result<(), ClientError> {
        self.submit(Command::Connect(url.into())).await
    }

    /// Send `AUTH_REQUEST`; ignored while disconnected
    pub async fn send_auth_request(&self, username: impl Into<String>) -> Result<(), ClientError> {
        self.submit(Command::AuthRequest(username.into())).await
    }

    /// Send `AUTH_RESPONSE`; ignored while disconnected
    pub async fn send_auth_response(&self, response: impl Into<String>) -> Result<(), ClientError> {
        self.submit(Command::AuthResponse(response.into())).await
    }

    /// Send `START_SESSION`; ignored while disconnected
    ///
    /// Returns `ClientError::InvalidCommand` if `cmd` has unbalanced quotes.
    pub async fn send_start_session(
        &self,
        env: impl Into<String>,
        cmd: impl Into<String>,
    ) -> Result<(), ClientError> {
        let (reply, rx) = oneshot::channel();
        self.submit(Command::StartSession {
            env: env.into(),
            cmd: cmd.into(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| ClientError::ActorGone)?
    }

    /// Close the active connection
    pub async fn disconnect(&self) -> Result<(), ClientError> {
        self.submit(Command::Disconnect).await
    }

    /// Empty the client log
    pub async fn clear_logs(&self) -> Result<(), ClientError> {
        self.submit(Command::ClearLogs).await
    }

    /// Read every reporter at once
    pub async fn snapshot(&self) -> Result<ClientSnapshot, ClientError> {
        let (reply, rx) = oneshot::channel();
        self.submit(Command::Snapshot(reply)).await?;
        rx.await.map_err(|_| ClientError::ActorGone)
    }

    /// Stop the client task, closing any connection
    pub async fn shutdown(&self) -> Result<(), ClientError> {
        self.submit(Command::Shutdown).await
    }

    async fn submit(&self, command: Command) -> Result<(), ClientError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ClientError::ActorGone)
    }
}

/// Client task: apply commands and transport events until shut down
async fn run_client<T: Transport>(
    mut client: ProtocolClient<T>,
    mut commands: mpsc::Receiver<Command>,
    mut transport_events: mpsc::Receiver<TransportEvent>,
    mut raised: mpsc::UnboundedReceiver<HostEvent>,
    subscribers: broadcast::Sender<ClientEvent>,
) {
    tracing::debug!("Client task started");

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Shutdown) | None => break,
                Some(command) => apply(&mut client, command),
            },
            Some(event) = transport_events.recv() => {
                client.handle_event(event);
                publish(&client, &mut raised, &subscribers);
            }
        }
    }

    client.disconnect();
    tracing::debug!("Client task stopped");
}

/// Forward events raised by the last transport event to subscribers
///
/// Each transport event raises at most one host event, so the client's last
/// message still belongs to the `Message` event being published.
fn publish<T: Transport>(
    client: &ProtocolClient<T>,
    raised: &mut mpsc::UnboundedReceiver<HostEvent>,
    subscribers: &broadcast::Sender<ClientEvent>,
) {
    while let Ok(kind) = raised.try_recv() {
        let message = match kind {
            HostEvent::Message => client.last_message().cloned(),
            _ => None,
        };
        // No subscribers is fine
        let _ = subscribers.send(ClientEvent { kind, message });
    }
}

fn apply<T: Transport>(client: &mut ProtocolClient<T>, command: Command) {
    match command {
        Command::Connect(url) => client.connect(&url),
        Command::AuthRequest(username) => client.send_auth_request(&username),
        Command::AuthResponse(response) => client.send_auth_response(&response),
        Command::StartSession { env, cmd, reply } => {
            let result = client.send_start_session(&env, &cmd);
            let _ = reply.send(result);
        }
        Command::Disconnect => client.disconnect(),
        Command::ClearLogs => client.clear_logs(),
        Command::Snapshot(reply) => {
            let _ = reply.send(ClientSnapshot::capture(client));
        }
        Command::Shutdown => {}
    }
}
