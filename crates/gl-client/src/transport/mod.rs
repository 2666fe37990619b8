//! Transport session abstraction
//!
//! A transport owns one outbound connection at a time. Operations never
//! block; everything the connection does afterwards is reported as a
//! [`TransportEvent`] tagged with the [`ConnectionId`] returned by `open`.

mod websocket;

pub use websocket::{WsTransport, TRANSPORT_EVENT_CHANNEL_CAPACITY};

use std::fmt;

/// Identifier of one connection handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl ConnectionId {
    /// Create a new connection ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Something that happened on a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEvent {
    /// Connection the event belongs to
    pub connection: ConnectionId,
    /// What happened
    pub kind: TransportEventKind,
}

impl TransportEvent {
    /// Create a new event
    pub fn new(connection: ConnectionId, kind: TransportEventKind) -> Self {
        Self { connection, kind }
    }
}

/// Transport event kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEventKind {
    /// Connection established
    Open,
    /// One complete text frame received
    Frame(String),
    /// Transport-level failure; a `Closed` always follows
    Error(String),
    /// Connection terminated by either side
    Closed,
}

/// Abstraction over the single outbound connection
pub trait Transport {
    /// Start opening a connection to `url`, closing any existing handle first
    fn open(&mut self, url: &str) -> ConnectionId;

    /// Send one text frame on the active handle; dropped if there is none
    fn send(&mut self, frame: String);

    /// Close the active handle without waiting for it to drain
    fn close(&mut self);

    /// Whether a handle currently exists
    fn is_open(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_display() {
        assert_eq!(ConnectionId::new(7).to_string(), "conn-7");
        assert_eq!(ConnectionId::new(3).0, 3);
    }

    #[test]
    fn test_connection_id_ordering() {
        assert!(ConnectionId::new(1) < ConnectionId::new(2));
        assert_ne!(ConnectionId::new(1), ConnectionId::new(2));
    }
}
