//! CLI command definitions and dispatch.

pub mod account;
pub mod config;
pub mod password;
pub mod token;

use clap::{Parser, Subcommand};

use gatekeeper_core::config::AppConfig;
use gatekeeper_core::error::AppError;

use crate::output::OutputFormat;

/// Gatekeeper: identity tokens and session admission
#[derive(Debug, Parser)]
#[command(name = "gatekeeper", version, about, long_about = None)]
pub struct Cli {
    /// Environment whose `config/{env}.toml` overlay is loaded
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Account provisioning
    Account(account::AccountArgs),
    /// Configuration checks
    Config(config::ConfigArgs),
    /// Issue and inspect tokens
    Token(token::TokenArgs),
    /// Password hashing
    Password(password::PasswordArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Account(args) => account::execute(args, config, self.format).await,
            Commands::Config(args) => config::execute(args, config, self.format),
            Commands::Token(args) => token::execute(args, config, self.format),
            Commands::Password(args) => password::execute(args, self.format).await,
        }
    }
}
