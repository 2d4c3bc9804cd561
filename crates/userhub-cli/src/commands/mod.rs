//! CLI command definitions and dispatch.

pub mod session;
pub mod user;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use userhub_auth::UserDirectory;
use userhub_core::config::AppConfig;
use userhub_core::error::AppError;

/// UserHub: file-backed users and sessions
#[derive(Debug, Parser)]
#[command(name = "userhub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Configuration environment overlay (`config/<env>.toml`)
    #[arg(long, env = "USERHUB_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// User management
    User(user::UserArgs),
    /// Session management
    Session(session::SessionArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(&self) -> Result<(), AppError> {
        let directory = open_directory(&self.config, &self.env)?;
        match &self.command {
            Commands::User(args) => user::execute(args, &directory, self.format),
            Commands::Session(args) => session::execute(args, &directory, self.format),
        }
    }
}

/// Helper: open the user directory named by the configuration
pub fn open_directory(config_path: &str, env: &str) -> Result<UserDirectory, AppError> {
    let config = AppConfig::load(config_path, env)?;
    tracing::debug!(config = %config_path, env = %env, "Loaded configuration");
    UserDirectory::from_config(&config)
}
