//! Account entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use gatekeeper_core::types::AccountId;
use gatekeeper_core::{AppError, AppResult};

use super::operator_status::OperatorStatus;
use super::role::AccountRole;

/// A registered account.
///
/// `operator_status` and `is_available` are role-conditioned: they are only
/// authoritative when `role` is [`AccountRole::Operator`]. For client and
/// admin accounts `operator_status` is always `None` and `is_available` is
/// ignored by admission, except that a capacity refusal clears it for every
/// role. Every mutation goes through a method on this type so the
/// conditions are checked in one place.
///
/// Accounts are never hard-deleted; [`Account::deactivate`] is the only
/// way to retire one.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Account {
    /// Unique account identifier.
    pub id: AccountId,
    /// Unique login name.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Opaque password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Account role.
    pub role: AccountRole,
    /// Verification status. `Some` exactly when `role` is operator.
    pub operator_status: Option<OperatorStatus>,
    /// Maximum number of concurrently active sessions (at least 1).
    pub max_sessions: i32,
    /// Whether an operator is accepting sessions.
    pub is_available: bool,
    /// Inactive accounts cannot log in or pass session validation.
    pub is_active: bool,
    /// Number of sessions ever created for this account.
    pub total_sessions: i64,
    /// Presence flag.
    pub is_online: bool,
    /// Last presence change.
    pub last_seen_at: Option<DateTime<Utc>>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Assigned role.
    pub role: AccountRole,
    /// Concurrent session capacity.
    pub max_sessions: i32,
}

impl Account {
    /// Build a fresh account.
    ///
    /// Operators start `pending` and unavailable; every account starts
    /// active and offline with no sessions.
    pub fn new(new: NewAccount, now: DateTime<Utc>) -> AppResult<Self> {
        let account = Self {
            id: AccountId::new(),
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            role: new.role,
            operator_status: new.role.is_operator().then_some(OperatorStatus::Pending),
            max_sessions: new.max_sessions,
            is_available: false,
            is_active: true,
            total_sessions: 0,
            is_online: false,
            last_seen_at: None,
            created_at: now,
            updated_at: now,
        };
        account.validate()?;
        Ok(account)
    }

    /// Check the invariants that every stored account must satisfy.
    pub fn validate(&self) -> AppResult<()> {
        if self.max_sessions < 1 {
            return Err(AppError::validation("max_sessions must be at least 1"));
        }
        if self.total_sessions < 0 {
            return Err(AppError::validation("total_sessions cannot be negative"));
        }
        match (self.role, self.operator_status) {
            (AccountRole::Operator, None) => Err(AppError::validation(
                "operator accounts must carry an operator status",
            )),
            (AccountRole::Client | AccountRole::Admin, Some(_)) => Err(AppError::validation(
                "operator status is only valid on operator accounts",
            )),
            _ => Ok(()),
        }
    }

    /// Check if this account is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Check if this account is an operator.
    pub fn is_operator(&self) -> bool {
        self.role.is_operator()
    }

    /// Whether this account is an operator that may not take sessions:
    /// not verified, or not available.
    pub fn operator_gate_closed(&self) -> bool {
        self.is_operator()
            && (self.operator_status != Some(OperatorStatus::Verified) || !self.is_available)
    }

    /// Change the verification status of an operator.
    pub fn set_operator_status(
        &mut self,
        status: OperatorStatus,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        if !self.is_operator() {
            return Err(AppError::precondition("not an operator"));
        }
        self.operator_status = Some(status);
        self.updated_at = now;
        Ok(())
    }

    /// Change whether an operator is accepting sessions.
    pub fn set_availability(&mut self, available: bool, now: DateTime<Utc>) -> AppResult<()> {
        if !self.is_operator() {
            return Err(AppError::precondition("not an operator"));
        }
        self.is_available = available;
        self.updated_at = now;
        Ok(())
    }

    /// Record that the account hit its session capacity.
    ///
    /// Applies to every role; for non-operators the flag is informational.
    pub fn mark_saturated(&mut self, now: DateTime<Utc>) {
        self.is_available = false;
        self.updated_at = now;
    }

    /// Record a newly admitted session.
    pub fn record_session_joined(&mut self, now: DateTime<Utc>) {
        self.total_sessions += 1;
        self.is_online = true;
        self.updated_at = now;
    }

    /// Record a presence change.
    pub fn mark_presence(&mut self, online: bool, now: DateTime<Utc>) {
        self.is_online = online;
        self.last_seen_at = Some(now);
        self.updated_at = now;
    }

    /// Retire the account without deleting it.
    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.is_active = false;
        self.is_online = false;
        self.updated_at = now;
    }
}
