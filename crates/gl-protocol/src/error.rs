//! Protocol error types

use thiserror::Error;

/// Errors that can occur while encoding or decoding frames
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Inbound frame is not valid JSON, or a known message type is missing fields
    #[error("Malformed frame: {0}")]
    Malformed(#[source] serde_json::Error),

    /// Outbound message could not be serialized
    #[error("Failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Errors produced while tokenising a session command string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    /// A quoted span was opened but never closed
    #[error("Unbalanced {quote} quote starting at byte {position}")]
    UnbalancedQuote { quote: char, position: usize },
}
