//! Session admission.
//!
//! Decides whether a session may be created or rejoined for an account,
//! given its role, operator state and concurrent-session capacity.

pub mod controller;
pub mod locks;

pub use controller::SessionAdmissionController;
pub use locks::AccountLocks;

use std::fmt;

use gatekeeper_core::error::AppError;

/// Why an admission was refused. Surfaced as a precondition failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDenial {
    /// A client already holds an active session and asked for a stream.
    StreamingLimit,
    /// An operator is not verified or not available.
    OperatorUnavailable,
    /// The account holds `max_sessions` active sessions.
    CapacityReached,
}

impl AdmissionDenial {
    /// Message carried by the precondition error.
    pub fn message(&self) -> &'static str {
        match self {
            Self::StreamingLimit => "client may have only one active streaming session",
            Self::OperatorUnavailable => "operator must be verified and available",
            Self::CapacityReached => "max sessions reached",
        }
    }
}

impl fmt::Display for AdmissionDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl From<AdmissionDenial> for AppError {
    fn from(denial: AdmissionDenial) -> Self {
        AppError::precondition(denial.message())
    }
}
