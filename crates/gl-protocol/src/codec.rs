//! JSON text-frame codec
//!
//! One WebSocket text frame carries exactly one JSON message. Outbound
//! messages are serialized compactly; inbound frames are decoded into
//! [`ServerMessage`], falling back to [`ServerMessage::Other`] for any
//! well-formed JSON whose `type` is not one we know.

use serde_json::Value;

use crate::error::ProtocolError;
use crate::message::{ClientMessage, KnownServerMessage, ServerMessage};

/// Serialize a client message into a text frame
pub fn encode(message: &ClientMessage) -> Result<String, ProtocolError> {
    serde_json::to_string(message).map_err(ProtocolError::Encode)
}

/// Decode an inbound text frame
///
/// Returns `Err` if the frame is not JSON at all, or if it claims a known
/// type but lacks that type's fields. Known types are checked field by field,
/// so `AUTH_MESSAGE` with `"message": null` is rejected as malformed rather
/// than shown as an empty prompt.
pub fn decode(frame: &str) -> Result<ServerMessage, ProtocolError> {
    let value: Value = serde_json::from_str(frame).map_err(ProtocolError::Malformed)?;

    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .map(str::to_owned);

    match kind {
        Some(ref k) if KnownServerMessage::is_known(k) => {
            let known: KnownServerMessage =
                serde_json::from_value(value).map_err(ProtocolError::Malformed)?;
            Ok(known.into())
        }
        _ => {
            tracing::trace!(kind = ?kind, "Decoded frame of unrecognised type");
            Ok(ServerMessage::Other { kind, body: value })
        }
    }
}
