//! Protocol client state machine
//!
//! Drives the connect → authenticate → start-session handshake on top of a
//! [`Transport`] and keeps the derived state hosts poll: connection flag,
//! loading flag, coarse session state, current prompt and the client log.
//!
//! # State transitions
//!
//! ```text
//! Disconnected --connect()---------> Connecting
//! Connecting   --Open--------------> Connected        raises Connect
//! (any)        --Error-------------> Error            raises Error
//! (any)        --Closed------------> Disconnected     raises Close
//! Connected    --send_auth_request-> Authenticating   (local only)
//! (connected)  --send_start_session> StartingSession  (local only)
//! (any)        --Frame-------------> unchanged        raises Message
//! ```
//!
//! `Authenticating` and `StartingSession` are bookkeeping for display; the
//! broker never confirms them and they do not gate further requests.
//!
//! Requests issued while not connected are silently ignored: no error, no
//! log entry, no state change. Hosts routinely race the connection state and
//! rely on this.
//!
//! The `loading` flag is raised by every request and only lowered by
//! transport events, so it stays set after a request the broker answers.

use gl_core::{ClientError, ConnectionState, HostEvent, LogBuffer, PromptState};
use gl_protocol::{ClientMessage, ServerMessage, SessionArgs};

use crate::hooks::{EventHooks, HookId};
use crate::transport::{ConnectionId, Transport, TransportEvent, TransportEventKind};

/// Client half of the login protocol
pub struct ProtocolClient<T: Transport> {
    transport: T,
    /// Handle whose events are currently accepted
    current: Option<ConnectionId>,
    state: ConnectionState,
    connected: bool,
    loading: bool,
    prompt: PromptState,
    log: LogBuffer,
    hooks: EventHooks,
    last_message: Option<ServerMessage>,
}

impl<T: Transport> ProtocolClient<T> {
    /// Create a client in the `Disconnected` state
    pub fn new(transport: T, log_capacity: usize) -> Self {
        Self {
            transport,
            current: None,
            state: ConnectionState::Disconnected,
            connected: false,
            loading: false,
            prompt: PromptState::default(),
            log: LogBuffer::new(log_capacity),
            hooks: EventHooks::new(),
            last_message: None,
        }
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Open a connection to `url`, replacing any existing one
    pub fn connect(&mut self, url: &str) {
        if self.transport.is_open() {
            tracing::debug!(previous = ?self.current, "Replacing existing connection");
            self.transport.close();
        }

        self.connected = false;
        self.loading = true;
        self.log.info(format!("connecting to {}", url));
        self.state = ConnectionState::Connecting;
        self.current = Some(self.transport.open(url));
    }

    /// Close the active connection; the close event completes the transition
    pub fn disconnect(&mut self) {
        if self.current.is_none() || !self.transport.is_open() {
            return;
        }
        self.log.info("closing connection");
        self.transport.close();
    }

    /// Ask the broker to start authenticating `username`
    pub fn send_auth_request(&mut self, username: &str) {
        if !self.connected {
            return;
        }

        self.loading = true;
        self.state = ConnectionState::Authenticating;
        self.log.info(format!("sending auth request: {}", username));
        self.transmit(ClientMessage::AuthRequest {
            username: username.to_string(),
        });
    }

    /// Answer the current prompt
    pub fn send_auth_response(&mut self, response: &str) {
        if !self.connected {
            return;
        }

        self.loading = true;
        self.log.info("sending auth response");
        self.transmit(ClientMessage::AuthResponse {
            response: response.to_string(),
        });
    }

    /// Ask the broker to start the session
    ///
    /// `env_spec` is a comma-separated `KEY=VALUE` list and `cmd_spec` a
    /// shell-like command line. Malformed quoting in `cmd_spec` is returned
    /// to the caller and nothing is sent.
    pub fn send_start_session(&mut self, env_spec: &str, cmd_spec: &str) -> Result<(), ClientError> {
        if !self.connected {
            return Ok(());
        }

        let SessionArgs { env, cmd } = SessionArgs::parse(env_spec, cmd_spec)?;

        self.loading = true;
        self.state = ConnectionState::StartingSession;
        self.log.info("sending start session request");
        self.transmit(ClientMessage::StartSession { env, cmd });
        Ok(())
    }

    /// Empty the client log
    pub fn clear_logs(&mut self) {
        self.log.clear();
    }

    // ------------------------------------------------------------------
    // Transport events
    // ------------------------------------------------------------------

    /// Apply one transport event
    ///
    /// Events from a handle other than the current one are ignored.
    pub fn handle_event(&mut self, event: TransportEvent) {
        if self.current != Some(event.connection) {
            tracing::debug!(connection = %event.connection, kind = ?event.kind, "Ignoring event from stale connection");
            return;
        }

        match event.kind {
            TransportEventKind::Open => self.on_open(),
            TransportEventKind::Frame(frame) => self.on_frame(&frame),
            TransportEventKind::Error(info) => self.on_error(&info),
            TransportEventKind::Closed => self.on_closed(),
        }
    }

    fn on_open(&mut self) {
        self.connected = true;
        self.loading = false;
        self.state = ConnectionState::Connected;
        self.log.info("connection established");
        self.hooks.emit(HostEvent::Connect);
    }

    fn on_frame(&mut self, frame: &str) {
        let message = match gl_protocol::decode(frame) {
            Ok(message) => message,
            Err(e) => {
                self.log.error(format!("failed to parse message: {}", e));
                return;
            }
        };

        self.log.info(format!("received: {}", frame.trim()));

        if let ServerMessage::AuthMessage {
            message,
            message_type,
        } = &message
        {
            self.prompt = PromptState::from_wire(message.as_str(), message_type);
        }

        self.last_message = Some(message);
        self.hooks.emit(HostEvent::Message);
    }

    fn on_error(&mut self, info: &str) {
        self.loading = false;
        self.state = ConnectionState::Error;
        self.log.error(format!("connection error: {}", info));
        self.hooks.emit(HostEvent::Error);
    }

    fn on_closed(&mut self) {
        self.connected = false;
        self.loading = false;
        self.state = ConnectionState::Disconnected;
        self.current = None;
        self.transport.close();
        self.log.warn("connection closed");
        self.hooks.emit(HostEvent::Close);
    }

    fn transmit(&mut self, message: ClientMessage) {
        match gl_protocol::encode(&message) {
            Ok(frame) => {
                tracing::debug!(kind = message.message_type(), "Sending message");
                self.transport.send(frame);
            }
            Err(e) => {
                if cfg!(debug_assertions) {
                    panic!("failed to encode {}: {}", message.message_type(), e);
                }
                self.log
                    .error(format!("failed to encode {}: {}", message.message_type(), e));
            }
        }
    }

    // ------------------------------------------------------------------
    // Hooks
    // ------------------------------------------------------------------

    /// Bind a callback to one host event
    pub fn on<F>(&mut self, event: HostEvent, callback: F) -> HookId
    where
        F: FnMut(HostEvent) + Send + 'static,
    {
        self.hooks.on(event, callback)
    }

    /// Access the hook registry
    pub fn hooks_mut(&mut self) -> &mut EventHooks {
        &mut self.hooks
    }

    // ------------------------------------------------------------------
    // Reporters
    // ------------------------------------------------------------------

    /// Whether the connection is open
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Whether a command is awaiting a transport event
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Coarse session state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Coarse session state as reported to hosts
    pub fn session_state(&self) -> String {
        self.state.to_string()
    }

    /// Text of the latest prompt
    pub fn prompt(&self) -> &str {
        &self.prompt.text
    }

    /// Lower-cased category of the latest prompt
    pub fn prompt_type(&self) -> &str {
        &self.prompt.category
    }

    /// Latest prompt as a whole
    pub fn prompt_state(&self) -> &PromptState {
        &self.prompt
    }

    /// Rendered log, oldest entry first
    pub fn logs(&self) -> String {
        self.log.render()
    }

    /// The log buffer itself
    pub fn log(&self) -> &LogBuffer {
        &self.log
    }

    /// Most recently decoded inbound message
    pub fn last_message(&self) -> Option<&ServerMessage> {
        self.last_message.as_ref()
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }
}
