//! Password CLI commands.

use clap::{Args, Subcommand};

use gatekeeper_auth::{Argon2Hasher, PasswordHasher};
use gatekeeper_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for password commands
#[derive(Debug, Args)]
pub struct PasswordArgs {
    /// Password subcommand
    #[command(subcommand)]
    pub command: PasswordCommand,
}

/// Password subcommands
#[derive(Debug, Subcommand)]
pub enum PasswordCommand {
    /// Hash a password with Argon2id
    Hash {
        /// Plaintext password
        password: String,
    },
    /// Check a password against a stored hash
    Verify {
        /// Plaintext password
        password: String,
        /// PHC-format hash
        hash: String,
    },
}

/// Execute password commands
pub async fn execute(args: &PasswordArgs, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        PasswordCommand::Hash { password } => {
            let password = password.clone();
            let hash = tokio::task::spawn_blocking(move || Argon2Hasher::new().hash(&password))
                .await
                .map_err(|e| AppError::internal(format!("Hashing task failed: {e}")))??;
            match format {
                OutputFormat::Json => output::print_item(&serde_json::json!({ "hash": hash }), format),
                OutputFormat::Text => println!("{hash}"),
            }
        }
        PasswordCommand::Verify { password, hash } => {
            let (password, hash) = (password.clone(), hash.clone());
            let matches =
                tokio::task::spawn_blocking(move || Argon2Hasher::new().verify(&password, &hash))
                    .await
                    .map_err(|e| AppError::internal(format!("Verification task failed: {e}")))??;
            if !matches {
                return Err(AppError::authentication("password does not match"));
            }
            output::print_success("Password matches");
        }
    }
    Ok(())
}
