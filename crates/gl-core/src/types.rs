//! Core domain types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse lifecycle state of the login session
///
/// `Authenticating` and `StartingSession` are set optimistically when the
/// corresponding request is sent; the broker never confirms them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionState {
    /// No connection
    #[default]
    Disconnected,
    /// Connection attempt in flight
    Connecting,
    /// Connected, handshake not started
    Connected,
    /// Authentication request sent
    Authenticating,
    /// Session start request sent
    StartingSession,
    /// Transport reported an error
    Error,
}

impl ConnectionState {
    /// Name reported to hosts
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "Disconnected",
            ConnectionState::Connecting => "Connecting",
            ConnectionState::Connected => "Connected",
            ConnectionState::Authenticating => "Authenticating",
            ConnectionState::StartingSession => "StartingSession",
            ConnectionState::Error => "Error",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Most recent prompt received from the broker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptState {
    /// Text to show the user
    pub text: String,
    /// Lower-cased category tag (e.g. `secret`, `visible`, `info`)
    pub category: String,
}

impl PromptState {
    /// Category reported before any prompt has arrived
    pub const DEFAULT_CATEGORY: &'static str = "info";

    /// Build a prompt from wire fields, normalising the category
    pub fn from_wire(message: impl Into<String>, message_type: &str) -> Self {
        Self {
            text: message.into(),
            category: message_type.to_lowercase(),
        }
    }

    /// Whether the prompt expects the user to type an answer
    pub fn expects_input(&self) -> bool {
        matches!(self.category.as_str(), "visible" | "secret" | "password")
    }

    /// Whether the answer should not be echoed
    pub fn is_secret(&self) -> bool {
        matches!(self.category.as_str(), "secret" | "password")
    }
}

impl Default for PromptState {
    fn default() -> Self {
        Self {
            text: String::new(),
            category: Self::DEFAULT_CATEGORY.to_string(),
        }
    }
}

/// Notifications raised to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostEvent {
    /// Connection established
    Connect,
    /// A well-formed frame arrived
    Message,
    /// Transport failure
    Error,
    /// Connection terminated
    Close,
}

impl fmt::Display for HostEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostEvent::Connect => write!(f, "onConnect"),
            HostEvent::Message => write!(f, "onMessage"),
            HostEvent::Error => write!(f, "onError"),
            HostEvent::Close => write!(f, "onClose"),
        }
    }
}
