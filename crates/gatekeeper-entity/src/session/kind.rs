//! Session type and participant role enumerations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use gatekeeper_core::AppError;

/// Kind of participation a session represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "session_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    /// A live stream. Clients may hold at most one at a time.
    Streaming,
    /// A consultation with an operator.
    Consultation,
    /// Passive viewing.
    Viewing,
}

impl SessionType {
    /// Return the type as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Streaming => "streaming",
            Self::Consultation => "consultation",
            Self::Viewing => "viewing",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "streaming" => Ok(Self::Streaming),
            "consultation" => Ok(Self::Consultation),
            "viewing" => Ok(Self::Viewing),
            _ => Err(AppError::validation(format!(
                "invalid session type '{s}': expected one of streaming, consultation, viewing"
            ))),
        }
    }
}

/// Role an account plays inside a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "participant_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    /// Owner of the stream or consultation.
    Host,
    /// Operator serving the session.
    Operator,
    /// Watcher.
    Viewer,
}

impl ParticipantRole {
    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Operator => "operator",
            Self::Viewer => "viewer",
        }
    }

    /// Parse an optional participant role; empty input means "unspecified".
    pub fn parse_optional(s: &str) -> Result<Option<Self>, AppError> {
        if s.is_empty() {
            Ok(None)
        } else {
            s.parse().map(Some)
        }
    }
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParticipantRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "host" => Ok(Self::Host),
            "operator" => Ok(Self::Operator),
            "viewer" => Ok(Self::Viewer),
            _ => Err(AppError::validation(format!(
                "invalid participant role '{s}': expected one of host, operator, viewer"
            ))),
        }
    }
}
