//! gl-protocol: Wire protocol for greetlink
//!
//! This crate defines the JSON text-frame protocol spoken between the login
//! client and the session broker over WebSocket, plus the parsers that turn
//! host-supplied `env` / `cmd` strings into the argument vectors carried by
//! `START_SESSION`.

pub mod args;
pub mod codec;
pub mod error;
pub mod message;

pub use args::{parse_env_spec, split_command, SessionArgs};
pub use codec::{decode, encode};
pub use error::{CommandParseError, ProtocolError};
pub use message::{ClientMessage, ServerMessage};
