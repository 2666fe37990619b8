//! greetlink CLI
//!
//! Terminal host for the login protocol client: drives a handshake
//! interactively and manages the configuration file.

pub mod commands;
pub mod output;
