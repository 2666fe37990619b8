//! gl-client: Login protocol client for greetlink
//!
//! The client owns at most one WebSocket connection to a session broker and
//! walks it through connect → authenticate → start session. Hosts issue
//! commands, poll reporters and subscribe to four notifications
//! (connect, message, error, close).
//!
//! [`ProtocolClient`] is the synchronous state machine; [`ClientHandle`]
//! runs it on a single tokio task and exposes it to any number of callers.

pub mod client;
pub mod hooks;
pub mod runtime;
pub mod transport;

pub use client::ProtocolClient;
pub use hooks::{EventHooks, HookId};
pub use runtime::{ClientEvent, ClientHandle, ClientSnapshot};
pub use transport::{ConnectionId, Transport, TransportEvent, TransportEventKind, WsTransport};
