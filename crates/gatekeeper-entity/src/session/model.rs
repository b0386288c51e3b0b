//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use gatekeeper_core::types::{AccountId, SessionId};
use gatekeeper_core::{AppError, AppResult};

use super::kind::{ParticipantRole, SessionType};

/// A participation session held by an account.
///
/// A session is active while `left_at` is `None`. For any account the
/// number of active sessions never exceeds the account's `max_sessions`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Unique session identifier.
    pub id: SessionId,
    /// Owning account.
    pub account_id: AccountId,
    /// Kind of participation.
    pub session_type: SessionType,
    /// Opaque correlation key supplied by the caller (stream or room id).
    pub external_id: String,
    /// Role inside the session, if the caller specified one.
    pub participant_role: Option<ParticipantRole>,
    /// When the session was admitted.
    pub joined_at: DateTime<Utc>,
    /// When the session was closed; `None` while active.
    pub left_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Build a newly admitted, active session.
    pub fn open(account_id: AccountId, request: &CreateSessionRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::new(),
            account_id,
            session_type: request.session_type,
            external_id: request.external_id.clone(),
            participant_role: request.participant_role,
            joined_at: now,
            left_at: None,
        }
    }

    /// Whether the session is still open.
    pub fn is_active(&self) -> bool {
        self.left_at.is_none()
    }

    /// Whole seconds between joining and leaving, or until `now` if still open.
    pub fn duration_seconds(&self, now: DateTime<Utc>) -> i64 {
        let end = self.left_at.unwrap_or(now);
        (end - self.joined_at).num_seconds().max(0)
    }
}

/// Request to admit a new session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    /// Kind of participation.
    pub session_type: SessionType,
    /// Correlation key; must be non-blank.
    pub external_id: String,
    /// Optional role inside the session.
    #[serde(default)]
    pub participant_role: Option<ParticipantRole>,
}

impl CreateSessionRequest {
    /// Parse a request from untrusted string fields.
    ///
    /// An empty `participant_role` means "unspecified".
    pub fn parse(session_type: &str, external_id: &str, participant_role: &str) -> AppResult<Self> {
        if session_type.trim().is_empty() {
            return Err(AppError::validation("session_type is required"));
        }
        let request = Self {
            session_type: session_type.parse()?,
            external_id: external_id.to_string(),
            participant_role: ParticipantRole::parse_optional(participant_role)?,
        };
        request.validate()?;
        Ok(request)
    }

    /// Check the request shape.
    pub fn validate(&self) -> AppResult<()> {
        if self.external_id.trim().is_empty() {
            return Err(AppError::validation("session_external_id is required"));
        }
        Ok(())
    }
}
