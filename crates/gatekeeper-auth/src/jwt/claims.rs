//! Claims carried by access and refresh tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gatekeeper_core::types::AccountId;
use gatekeeper_entity::{AccountRole, OperatorStatus};

use crate::rbac::Permission;

/// Distinguishes access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived token presented on every request.
    Access,
    /// Long-lived token exchanged for a new pair.
    Refresh,
}

/// Access token payload.
///
/// Role, operator state and permissions are a snapshot taken at issuance.
/// A role change, operator verification or availability change is not
/// reflected until the token expires or the holder refreshes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Token id, unique per issuance; the revocation key.
    pub jti: Uuid,
    /// Subject account.
    pub sub: AccountId,
    /// Account email at issuance.
    pub email: String,
    /// Account role at issuance.
    pub role: AccountRole,
    /// Operator status at issuance (operators only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_status: Option<OperatorStatus>,
    /// Operator availability at issuance.
    pub is_available: bool,
    /// Permissions granted to `role` at issuance.
    pub permissions: Vec<Permission>,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiry (seconds since epoch).
    pub exp: i64,
    /// Always [`TokenType::Access`].
    pub token_type: TokenType,
}

impl Claims {
    /// Returns the subject account id.
    pub fn account_id(&self) -> AccountId {
        self.sub
    }

    /// Whether the snapshot grants `permission`.
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.iter().any(|p| *p == permission)
    }

    /// Whether the token was issued to an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Expiry as a timestamp.
    pub fn expires_at(&self) -> DateTime<Utc> {
        timestamp(self.exp)
    }
}

/// Refresh token payload: subject and lifetime only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshClaims {
    /// Token id, unique per issuance.
    pub jti: Uuid,
    /// Subject account.
    pub sub: AccountId,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiry (seconds since epoch).
    pub exp: i64,
    /// Always [`TokenType::Refresh`].
    pub token_type: TokenType,
}

impl RefreshClaims {
    /// Expiry as a timestamp.
    pub fn expires_at(&self) -> DateTime<Utc> {
        timestamp(self.exp)
    }
}

/// Result of a successful pair issuance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Access token lifetime in seconds, from the configured TTL.
    pub expires_in: u64,
    /// Access token expiry.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiry.
    pub refresh_expires_at: DateTime<Utc>,
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}
