//! Operator verification status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use gatekeeper_core::AppError;

/// Verification state of an operator account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "operator_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OperatorStatus {
    /// Registered, awaiting admin review.
    Pending,
    /// Cleared to take sessions.
    Verified,
    /// Refused by an admin.
    Blocked,
}

impl OperatorStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Blocked => "blocked",
        }
    }
}

impl fmt::Display for OperatorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperatorStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "verified" => Ok(Self::Verified),
            "blocked" => Ok(Self::Blocked),
            _ => Err(AppError::validation(format!(
                "invalid operator status '{s}': expected one of pending, verified, blocked"
            ))),
        }
    }
}
