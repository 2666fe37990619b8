//! Message types for the greetlink protocol
//!
//! Every frame is a single JSON object carrying a `type` discriminator in
//! SCREAMING_SNAKE_CASE. The client sends three request kinds; the broker
//! answers with authentication prompts and outcomes.
//!
//! # Message Flow
//!
//! 1. Client connects and sends `AUTH_REQUEST` with a username
//! 2. Broker replies with zero or more `AUTH_MESSAGE` prompts, each answered
//!    by an `AUTH_RESPONSE`
//! 3. Broker sends `AUTH_SUCCESS` (or `AUTH_ERROR`)
//! 4. Client sends `START_SESSION` with the environment and command vectors
//! 5. Broker confirms with `AUTH_SUCCESS` and hands the seat to the session
//!
//! Unknown inbound types are kept as [`ServerMessage::Other`] so newer brokers
//! never break older clients.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Discriminator of an inbound authentication prompt
pub const AUTH_MESSAGE: &str = "AUTH_MESSAGE";
/// Discriminator of an inbound success notification
pub const AUTH_SUCCESS: &str = "AUTH_SUCCESS";
/// Discriminator of an inbound failure notification
pub const AUTH_ERROR: &str = "AUTH_ERROR";

/// Messages sent from the client to the broker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    /// Begin authentication for a user
    AuthRequest { username: String },

    /// Answer to the most recent prompt
    AuthResponse { response: String },

    /// Start the user session once authenticated
    StartSession {
        /// `KEY=VALUE` environment entries
        env: Vec<String>,
        /// Command line, already split into arguments
        cmd: Vec<String>,
    },
}

impl ClientMessage {
    /// Wire name of this message's `type` field
    pub fn message_type(&self) -> &'static str {
        match self {
            ClientMessage::AuthRequest { .. } => "AUTH_REQUEST",
            ClientMessage::AuthResponse { .. } => "AUTH_RESPONSE",
            ClientMessage::StartSession { .. } => "START_SESSION",
        }
    }
}

/// Messages received from the broker
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// A prompt or notice to show the user during authentication
    AuthMessage {
        /// Text to display, verbatim
        message: String,
        /// Prompt category as sent by the broker (e.g. `SECRET`, `INFO`)
        message_type: String,
    },

    /// The last request succeeded
    AuthSuccess,

    /// The last request failed
    AuthError { reason: String },

    /// Any other well-formed frame; no fields are extracted
    Other {
        /// Value of the `type` field, if the frame had a string one
        kind: Option<String>,
        /// The whole decoded frame
        body: Value,
    },
}

impl ServerMessage {
    /// Wire name of this message's `type` field, if any
    pub fn message_type(&self) -> Option<&str> {
        match self {
            ServerMessage::AuthMessage { .. } => Some(AUTH_MESSAGE),
            ServerMessage::AuthSuccess => Some(AUTH_SUCCESS),
            ServerMessage::AuthError { .. } => Some(AUTH_ERROR),
            ServerMessage::Other { kind, .. } => kind.as_deref(),
        }
    }
}

/// Inbound types with a fixed shape, decoded strictly
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum KnownServerMessage {
    AuthMessage {
        message: String,
        message_type: String,
    },
    AuthSuccess,
    AuthError {
        reason: String,
    },
}

impl KnownServerMessage {
    /// Whether `kind` names one of the strictly decoded types
    pub(crate) fn is_known(kind: &str) -> bool {
        matches!(kind, AUTH_MESSAGE | AUTH_SUCCESS | AUTH_ERROR)
    }
}

impl From<KnownServerMessage> for ServerMessage {
    fn from(msg: KnownServerMessage) -> Self {
        match msg {
            KnownServerMessage::AuthMessage {
                message,
                message_type,
            } => ServerMessage::AuthMessage {
                message,
                message_type,
            },
            KnownServerMessage::AuthSuccess => ServerMessage::AuthSuccess,
            KnownServerMessage::AuthError { reason } => ServerMessage::AuthError { reason },
        }
    }
}
