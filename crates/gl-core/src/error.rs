//! Core error types for greetlink

use gl_protocol::CommandParseError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced synchronously by client commands
///
/// Transport failures are never returned here; they are reported through
/// the client log and the `Error` host event.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The session command string could not be tokenised
    #[error("Invalid session command: {0}")]
    InvalidCommand(#[from] CommandParseError),

    /// The client task has stopped and no longer accepts commands
    #[error("Client task is no longer running")]
    ActorGone,
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
