//! Session argument parsing
//!
//! Hosts describe the session to start with two plain strings: a
//! comma-separated environment list and a shell-like command line. These are
//! turned into the `env` and `cmd` vectors of `START_SESSION`.

use crate::error::CommandParseError;

/// Parsed arguments for a `START_SESSION` request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionArgs {
    /// `KEY=VALUE` entries, in the order given
    pub env: Vec<String>,
    /// Command and its arguments
    pub cmd: Vec<String>,
}

impl SessionArgs {
    /// Parse both host strings, failing only on malformed command quoting
    pub fn parse(env_spec: &str, cmd_spec: &str) -> Result<Self, CommandParseError> {
        Ok(Self {
            env: parse_env_spec(env_spec),
            cmd: split_command(cmd_spec)?,
        })
    }
}

/// Split a comma-separated `KEY=VALUE` list
///
/// Each entry is trimmed; entries that are empty after trimming are dropped.
pub fn parse_env_spec(spec: &str) -> Vec<String> {
    spec.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Tokenise a command line
///
/// A token is either a run of characters that are neither whitespace nor a
/// quote, or a span enclosed in matching single or double quotes. Quotes are
/// stripped and nothing inside them is escaped. Adjacent spans such as
/// `a"b c"` produce separate tokens (`a`, `b c`).
pub fn split_command(spec: &str) -> Result<Vec<String>, CommandParseError> {
    let mut tokens = Vec::new();
    let mut chars = spec.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c == '"' || c == '\'' {
            chars.next();
            let mut span = String::new();
            let mut closed = false;
            for (_, inner) in chars.by_ref() {
                if inner == c {
                    closed = true;
                    break;
                }
                span.push(inner);
            }
            if !closed {
                return Err(CommandParseError::UnbalancedQuote {
                    quote: c,
                    position: start,
                });
            }
            tokens.push(span);
            continue;
        }

        let mut word = String::new();
        while let Some(&(_, next)) = chars.peek() {
            if next.is_whitespace() || next == '"' || next == '\'' {
                break;
            }
            word.push(next);
            chars.next();
        }
        tokens.push(word);
    }

    Ok(tokens)
}
