//! Token CLI commands.

use std::sync::Arc;

use clap::{Args, Subcommand};

use gatekeeper_auth::{RbacPolicies, TokenService};
use gatekeeper_core::config::AppConfig;
use gatekeeper_core::error::AppError;
use gatekeeper_core::traits::SystemClock;
use gatekeeper_core::types::AccountId;
use gatekeeper_entity::OperatorStatus;

use crate::output::{self, OutputFormat};

/// Arguments for token commands
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Token subcommand
    #[command(subcommand)]
    pub command: TokenCommand,
}

/// Token subcommands
#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Issue an access/refresh pair signed with the configured secret
    Issue {
        /// Subject account id; a random id is used when omitted
        #[arg(long)]
        account_id: Option<String>,
        /// Email claim
        #[arg(long)]
        email: String,
        /// Role claim; unknown roles fall back to client
        #[arg(long, default_value = "client")]
        role: String,
        /// Operator status claim, for operator tokens
        #[arg(long, default_value = "pending")]
        operator_status: String,
        /// Availability claim
        #[arg(long)]
        available: bool,
    },
    /// Validate a token and print its claims
    Inspect {
        /// Encoded token
        token: String,
    },
}

/// Execute token commands
pub fn execute(args: &TokenArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    config.validate()?;
    let tokens = TokenService::from_config(&config.auth, Arc::new(SystemClock));

    match &args.command {
        TokenCommand::Issue {
            account_id,
            email,
            role,
            operator_status,
            available,
        } => {
            let account_id = match account_id {
                Some(id) => AccountId::parse(id)?,
                None => AccountId::new(),
            };
            let role = RbacPolicies::resolve_role(role);
            let operator_status = if role.is_operator() {
                Some(operator_status.parse::<OperatorStatus>()?)
            } else {
                None
            };

            let pair = tokens.issue_pair(account_id, email, role, operator_status, *available)?;
            tracing::info!(%account_id, %role, "Token pair issued from CLI");
            output::print_item(&pair, format);
        }
        TokenCommand::Inspect { token } => {
            if let Ok(claims) = tokens.validate_access(token) {
                output::print_item(&claims, format);
            } else {
                let claims = tokens.decode_refresh(token)?;
                output::print_item(&claims, format);
            }
        }
    }
    Ok(())
}
