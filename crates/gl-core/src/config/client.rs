//! Client configuration

use serde::{Deserialize, Serialize};

use crate::log::DEFAULT_LOG_CAPACITY;

/// Port the local session broker listens on
pub const DEFAULT_PORT: u16 = 12801;

/// Default broker endpoint (loopback)
pub const DEFAULT_URL: &str = "ws://127.0.0.1:12801/ws";

/// Configuration for the login client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// WebSocket endpoint of the session broker
    pub url: String,

    /// Number of log entries kept in memory
    pub log_capacity: usize,

    /// Buffer size for host event subscribers; slow subscribers skip events
    pub event_capacity: usize,

    /// Username to authenticate as (prompted for if absent)
    pub username: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            log_capacity: DEFAULT_LOG_CAPACITY,
            event_capacity: 64,
            username: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_url_uses_default_port() {
        let config = ClientConfig::default();
        assert!(config.url.contains(&DEFAULT_PORT.to_string()));
        assert_eq!(config.log_capacity, 100);
    }
}
