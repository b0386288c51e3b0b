//! PostgreSQL store backend.
//!
//! The expected schema is in `sql/schema.sql` at the crate root.

pub mod account;
pub mod connection;
pub mod session;

pub use account::PgAccountStore;
pub use connection::DatabasePool;
pub use session::PgSessionStore;

use gatekeeper_core::error::{AppError, ErrorKind};

/// Map a sqlx error into an [`AppError`], turning unique violations into
/// conflicts named after the violated constraint.
fn map_db_error(context: &str, err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            let message = match db.constraint() {
                Some("accounts_email_key") => "email already registered",
                Some("accounts_username_key") => "username already taken",
                _ => "record already exists",
            };
            return AppError::with_source(ErrorKind::Conflict, message, err);
        }
    }
    AppError::with_source(ErrorKind::Database, context.to_string(), err)
}
