//! Convenience result type alias for Gatekeeper.

use crate::error::AppError;

/// A specialized `Result` type for Gatekeeper operations.
pub type AppResult<T> = Result<T, AppError>;
