//! Account role enumeration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use gatekeeper_core::AppError;

/// Role of an account. Determines the permission set carried in tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "account_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    /// End user who starts streams and consultations.
    #[default]
    Client,
    /// Staff member who joins consultations once verified.
    Operator,
    /// Administrator; verifies operators and reads statistics.
    Admin,
}

impl AccountRole {
    /// All roles, in privilege order.
    pub const ALL: [AccountRole; 3] = [Self::Client, Self::Operator, Self::Admin];

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Operator => "operator",
            Self::Admin => "admin",
        }
    }

    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Check if this role is an operator.
    pub fn is_operator(&self) -> bool {
        matches!(self, Self::Operator)
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Self::Client),
            "operator" => Ok(Self::Operator),
            "admin" => Ok(Self::Admin),
            _ => Err(AppError::validation(format!(
                "invalid role '{s}': expected one of client, operator, admin"
            ))),
        }
    }
}
