//! gl-core: Core abstractions and configuration for greetlink
//!
//! This crate provides the shared state types, the bounded client log and
//! configuration structures used by the client runtime and the CLI.

pub mod config;
pub mod error;
pub mod log;
pub mod types;

pub use error::{ClientError, ConfigError};
pub use log::{LogBuffer, LogEntry, Severity, DEFAULT_LOG_CAPACITY};
pub use types::{ConnectionState, HostEvent, PromptState};
