//! Session start defaults

use serde::{Deserialize, Serialize};

/// Placeholder substituted with the broker-side session command
pub const SESSION_COMMAND_PLACEHOLDER: &str = "%SESSION_COMMAND%";

/// Defaults used when the host does not supply `env` / `cmd`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionDefaults {
    /// Comma-separated `KEY=VALUE` list
    pub env: String,

    /// Command line; may contain [`SESSION_COMMAND_PLACEHOLDER`]
    pub command: String,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            env: "LANG=C.UTF-8".to_string(),
            command: SESSION_COMMAND_PLACEHOLDER.to_string(),
        }
    }
}

impl SessionDefaults {
    /// Expand the placeholder from `$SESSION_COMMAND`, then `$SHELL`
    pub fn resolve_command(&self) -> String {
        expand_placeholder(&self.command, |key| std::env::var(key).ok())
    }
}

fn expand_placeholder(command: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    if !command.contains(SESSION_COMMAND_PLACEHOLDER) {
        return command.to_string();
    }

    let replacement = lookup("SESSION_COMMAND")
        .filter(|v| !v.is_empty())
        .or_else(|| lookup("SHELL"))
        .unwrap_or_else(|| "/bin/sh".to_string());

    command.replace(SESSION_COMMAND_PLACEHOLDER, &replacement)
}
