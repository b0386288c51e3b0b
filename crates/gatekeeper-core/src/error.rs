//! Unified application error types for Gatekeeper.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the `?` operator. The transport layer converts an
//! error into a [`TransportStatus`] with [`AppError::status`] and renders
//! [`AppError::public_message`] to callers.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level error kind categorization used across the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Input validation failed (malformed id, bad input shape).
    Validation,
    /// The requested resource was not found.
    NotFound,
    /// Authentication failed (bad credentials, invalid, expired or revoked token).
    Authentication,
    /// The caller lacks the role or permission for the action.
    Authorization,
    /// A uniqueness constraint was violated.
    Conflict,
    /// The request is well-formed but the account state forbids it.
    Precondition,
    /// An internal error occurred.
    Internal,
    /// A database error occurred.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
}

impl ErrorKind {
    /// Transport status this kind is surfaced as.
    pub fn status(&self) -> TransportStatus {
        match self {
            Self::Validation => TransportStatus::InvalidArgument,
            Self::NotFound => TransportStatus::NotFound,
            Self::Authentication => TransportStatus::Unauthenticated,
            Self::Authorization => TransportStatus::PermissionDenied,
            Self::Conflict => TransportStatus::AlreadyExists,
            Self::Precondition => TransportStatus::FailedPrecondition,
            Self::Internal | Self::Database | Self::Configuration | Self::Serialization => {
                TransportStatus::Internal
            }
        }
    }

    /// Whether errors of this kind carry detail that must not reach callers.
    pub fn is_internal(&self) -> bool {
        self.status() == TransportStatus::Internal
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "VALIDATION"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Authentication => write!(f, "AUTHENTICATION"),
            Self::Authorization => write!(f, "AUTHORIZATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Precondition => write!(f, "PRECONDITION"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
        }
    }
}

/// Status codes understood by any transport (HTTP or RPC) in front of the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportStatus {
    /// Malformed id or bad input shape.
    InvalidArgument,
    /// Account or session not found.
    NotFound,
    /// Bad credentials or a revoked, expired or invalid token.
    Unauthenticated,
    /// Authenticated, but role or permission does not allow the action.
    PermissionDenied,
    /// Duplicate email or username.
    AlreadyExists,
    /// Account state does not allow the action.
    FailedPrecondition,
    /// Anything else.
    Internal,
}

impl TransportStatus {
    /// HTTP status code for this status.
    pub fn http_code(&self) -> u16 {
        match self {
            Self::InvalidArgument => 400,
            Self::Unauthenticated => 401,
            Self::PermissionDenied => 403,
            Self::NotFound => 404,
            Self::AlreadyExists => 409,
            Self::FailedPrecondition => 412,
            Self::Internal => 500,
        }
    }

    /// Stable machine-readable code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::NotFound => "NOT_FOUND",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::FailedPrecondition => "FAILED_PRECONDITION",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for TransportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unified application error used throughout Gatekeeper.
///
/// Crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    /// The opaque authentication failure surfaced for any token problem.
    pub fn unauthorized() -> Self {
        Self::authentication(UNAUTHORIZED)
    }

    /// Create an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    /// The authorization failure surfaced for role and permission mismatches.
    pub fn forbidden() -> Self {
        Self::authorization(FORBIDDEN)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a precondition error.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Precondition, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Transport status for this error.
    pub fn status(&self) -> TransportStatus {
        self.kind.status()
    }

    /// Message safe to return to an untrusted caller.
    ///
    /// Internal failures are surfaced generically and authentication
    /// failures are always the opaque `"unauthorized"`.
    pub fn public_message(&self) -> &str {
        match self.kind {
            ErrorKind::Authentication => UNAUTHORIZED,
            kind if kind.is_internal() => INTERNAL,
            _ => &self.message,
        }
    }
}

const UNAUTHORIZED: &str = "unauthorized";
const FORBIDDEN: &str = "forbidden";
const INTERNAL: &str = "internal error";

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
