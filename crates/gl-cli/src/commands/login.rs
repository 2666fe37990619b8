//! Login command implementation
//!
//! Acts as the host for the protocol client: reacts to its events, answers
//! prompts from the terminal and starts the session once authenticated.

use std::io::IsTerminal;

use anyhow::{bail, Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::broadcast::{self, error::RecvError};

use gl_client::{ClientEvent, ClientHandle};
use gl_core::config::ConfigFile;
use gl_core::{HostEvent, PromptState};
use gl_protocol::ServerMessage;

use crate::output::{print_error, print_info, print_notice, print_prompt, print_success};

/// Options for a login attempt, already merged with the config file
#[derive(Debug, Clone)]
pub struct LoginOptions {
    pub url: String,
    pub username: Option<String>,
    pub env: String,
    pub cmd: String,
    pub show_log: bool,
}

impl LoginOptions {
    /// Fill unset options from the config file
    pub fn resolve(
        config: &ConfigFile,
        url: Option<String>,
        username: Option<String>,
        env: Option<String>,
        cmd: Option<String>,
        show_log: bool,
    ) -> Self {
        Self {
            url: url.unwrap_or_else(|| config.client.url.clone()),
            username: username.or_else(|| config.client.username.clone()),
            env: env.unwrap_or_else(|| config.session.env.clone()),
            cmd: cmd.unwrap_or_else(|| config.session.resolve_command()),
            show_log,
        }
    }
}

/// Execute the login command
pub async fn login_command(config: &ConfigFile, options: LoginOptions) -> Result<()> {
    let username = match options.username.clone() {
        Some(name) => name,
        None => read_line_blocking("Username:".to_string()).await?,
    };

    let client = ClientHandle::spawn(&config.client);
    let mut events = client.subscribe();

    print_info(&format!("Connecting to {}...", options.url));
    client.connect(options.url.clone()).await?;

    let outcome = drive_handshake(&client, &mut events, &username, &options).await;

    if options.show_log {
        let snapshot = client.snapshot().await?;
        println!("{}", snapshot.logs);
    }
    if let Err(e) = client.shutdown().await {
        tracing::debug!("Client already stopped: {}", e);
    }

    outcome
}

/// Where the handshake stands, from the CLI's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Authenticating,
    SessionRequested,
}

async fn drive_handshake(
    client: &ClientHandle,
    events: &mut broadcast::Receiver<ClientEvent>,
    username: &str,
    options: &LoginOptions,
) -> Result<()> {
    let mut phase = Phase::Authenticating;

    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(missed)) => {
                tracing::warn!("Missed {} client events", missed);
                continue;
            }
            Err(RecvError::Closed) => bail!("Client stopped unexpectedly"),
        };

        match (event.kind, phase) {
            (HostEvent::Connect, _) => {
                print_success("Connected");
                client.send_auth_request(username).await?;
            }
            (HostEvent::Message, _) => match event.message {
                Some(ServerMessage::AuthMessage {
                    message,
                    message_type,
                }) => {
                    let prompt = PromptState::from_wire(message, &message_type);
                    let answer = answer_prompt(prompt).await?;
                    client.send_auth_response(answer).await?;
                }
                Some(ServerMessage::AuthSuccess) if phase == Phase::Authenticating => {
                    print_success("Authenticated");
                    client
                        .send_start_session(options.env.clone(), options.cmd.clone())
                        .await
                        .with_context(|| format!("Cannot start session '{}'", options.cmd))?;
                    phase = Phase::SessionRequested;
                }
                Some(ServerMessage::AuthSuccess) => {
                    print_success("Session started");
                    return Ok(());
                }
                Some(ServerMessage::AuthError { reason }) => {
                    bail!("Authentication failed: {}", reason);
                }
                Some(ServerMessage::Other { kind, .. }) => {
                    tracing::debug!(?kind, "Ignoring message");
                }
                None => {}
            },
            // The broker hands the seat to the session and drops the socket,
            // often without a close handshake
            (HostEvent::Error, Phase::SessionRequested) => {
                tracing::debug!("Connection error after session start request");
            }
            (HostEvent::Close, Phase::SessionRequested) => {
                print_success("Session started");
                return Ok(());
            }
            (HostEvent::Error, Phase::Authenticating) => {
                print_error("Connection error");
            }
            (HostEvent::Close, Phase::Authenticating) => {
                bail!("Connection closed before the session started");
            }
        }
    }
}

/// Show a prompt and collect the answer (empty for notices)
async fn answer_prompt(prompt: PromptState) -> Result<String> {
    if !prompt.expects_input() {
        print_notice(&prompt);
        return Ok(String::new());
    }

    tokio::task::spawn_blocking(move || {
        print_prompt(&prompt.text);
        if prompt.is_secret() && std::io::stdin().is_terminal() {
            read_secret()
        } else {
            read_line()
        }
    })
    .await
    .context("Prompt task failed")?
}

async fn read_line_blocking(prompt: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        print_prompt(&prompt);
        read_line()
    })
    .await
    .context("Prompt task failed")?
}

fn read_line() -> Result<String> {
    let mut line = String::new();
    let read = std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    if read == 0 {
        bail!("stdin closed");
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Read a line without echoing it
fn read_secret() -> Result<String> {
    crossterm::terminal::enable_raw_mode().context("Failed to enter raw mode")?;
    let result = read_secret_raw();
    crossterm::terminal::disable_raw_mode().context("Failed to leave raw mode")?;
    println!();
    result
}

fn read_secret_raw() -> Result<String> {
    let mut secret = String::new();
    loop {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) = event::read()?
        else {
            continue;
        };
        if kind != KeyEventKind::Press {
            continue;
        }
        match code {
            KeyCode::Enter => return Ok(secret),
            KeyCode::Backspace => {
                secret.pop();
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                bail!("Interrupted")
            }
            KeyCode::Char(c) => secret.push(c),
            _ => {}
        }
    }
}
