//! CLI command implementations

mod config;
mod login;

pub use config::{config_get, config_init, config_path, config_show};
pub use login::{login_command, LoginOptions};
