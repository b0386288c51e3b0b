//! Account provisioning commands.

use std::sync::Arc;

use clap::{Args, Subcommand};

use gatekeeper_auth::Argon2Hasher;
use gatekeeper_core::config::AppConfig;
use gatekeeper_core::error::AppError;
use gatekeeper_core::traits::SystemClock;
use gatekeeper_core::types::PageRequest;
use gatekeeper_service::Services;
use gatekeeper_service::validation::RegisterRequest;

use crate::output::{self, OutputFormat};

/// Arguments for account commands
#[derive(Debug, Args)]
pub struct AccountArgs {
    /// Account subcommand
    #[command(subcommand)]
    pub command: AccountCommand,
}

/// Account subcommands
#[derive(Debug, Subcommand)]
pub enum AccountCommand {
    /// Create an account of any role, including admin
    Create {
        /// Email
        #[arg(short, long)]
        email: String,
        /// Password
        #[arg(short, long)]
        password: String,
        /// Username; defaults to the email
        #[arg(short, long, default_value = "")]
        username: String,
        /// Role: client, operator or admin
        #[arg(short, long, default_value = "client")]
        role: String,
    },
    /// List accounts
    List {
        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u64,
        /// Items per page
        #[arg(long, default_value_t = 25)]
        page_size: u64,
    },
}

/// Execute account commands
pub async fn execute(
    args: &AccountArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    config.validate()?;
    if !config.database.is_configured() {
        return Err(AppError::configuration(
            "database.url is required for account commands",
        ));
    }
    let services = Services::connect(
        config,
        Arc::new(Argon2Hasher::new()),
        Arc::new(SystemClock),
    )
    .await?;

    match &args.command {
        AccountCommand::Create {
            email,
            password,
            username,
            role,
        } => {
            let account = services
                .accounts
                .register(RegisterRequest {
                    username: username.clone(),
                    email: email.clone(),
                    password: password.clone(),
                    role: role.clone(),
                })
                .await?;
            output::print_success(&format!("Account '{}' created", account.username));
            output::print_item(&account, format);
        }
        AccountCommand::List { page, page_size } => {
            let accounts = services
                .accounts
                .list(PageRequest::new(*page, *page_size))
                .await?;
            output::print_item(&accounts, format);
        }
    }
    Ok(())
}
