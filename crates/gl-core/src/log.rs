//! Bounded client log
//!
//! Hosts have no structured error channel; everything the client wants them
//! to know ends up here. The buffer keeps only the most recent entries and
//! evicts the oldest first. Every entry is also forwarded to `tracing` so the
//! same information reaches the process log.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Number of entries kept when no capacity is configured
pub const DEFAULT_LOG_CAPACITY: usize = 100;

/// Severity of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warn => write!(f, "warn"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single log line
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Local wall-clock time the entry was recorded
    pub timestamp: DateTime<Local>,
    /// Human-readable text
    pub message: String,
    /// Severity
    pub severity: Severity,
}

impl LogEntry {
    /// Render as `HH:MM:SS: message`
    pub fn render(&self) -> String {
        format!("{}: {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Ring buffer of the most recent log entries
#[derive(Debug, Clone)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl LogBuffer {
    /// Create a buffer holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest if the buffer is full
    pub fn push(&mut self, message: impl Into<String>, severity: Severity) {
        let message = message.into();
        match severity {
            Severity::Info => tracing::info!("{}", message),
            Severity::Warn => tracing::warn!("{}", message),
            Severity::Error => tracing::error!("{}", message),
        }

        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            timestamp: Local::now(),
            message,
            severity,
        });
    }

    /// Shorthand for an info entry
    pub fn info(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Info);
    }

    /// Shorthand for a warning entry
    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Warn);
    }

    /// Shorthand for an error entry
    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message, Severity::Error);
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Render all entries oldest first, one per line
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(LogEntry::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Iterate entries oldest first
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Number of entries currently held
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries held
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}
