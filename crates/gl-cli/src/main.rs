//! greetlink CLI
//!
//! Logs in to a WebSocket session broker from the terminal:
//! - `login` runs the authenticate / start-session handshake
//! - `config` inspects and creates the configuration file

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gl_core::config;
use greetlink::commands::{self, LoginOptions};
use greetlink::output::print_error;

#[derive(Parser)]
#[command(name = "greetlink")]
#[command(author, version, about = "Terminal login client for WebSocket session brokers")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "GREETLINK_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate and start a session
    Login {
        /// Broker endpoint (overrides config)
        #[arg(long)]
        url: Option<String>,
        /// User to log in as (prompted for if not configured)
        #[arg(short, long)]
        username: Option<String>,
        /// Session environment as comma-separated KEY=VALUE pairs
        #[arg(short, long)]
        env: Option<String>,
        /// Session command line
        #[arg(long)]
        cmd: Option<String>,
        /// Print the client log when done
        #[arg(long)]
        show_log: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Get specific config value
    Get { key: String },
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Login {
            url,
            username,
            env,
            cmd,
            show_log,
        } => {
            let config = config::load_or_default(config_path)
                .with_context(|| "Failed to load configuration")?;
            let options = LoginOptions::resolve(&config, url, username, env, cmd, show_log);

            if let Err(e) = commands::login_command(&config, options).await {
                print_error(&format!("{:#}", e));
                std::process::exit(1);
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_show(config_path)?,
            ConfigAction::Get { key } => commands::config_get(config_path, &key)?,
            ConfigAction::Init { force } => commands::config_init(config_path, force)?,
            ConfigAction::Path => commands::config_path(config_path)?,
        },
    }

    Ok(())
}
