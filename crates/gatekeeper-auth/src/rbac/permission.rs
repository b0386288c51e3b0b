//! Permission vocabulary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use gatekeeper_core::AppError;

/// A capability carried in access tokens.
///
/// The string forms are part of the token format and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    /// Start a stream.
    #[serde(rename = "stream:create")]
    StreamCreate,
    /// Join a stream.
    #[serde(rename = "stream:join")]
    StreamJoin,
    /// Send chat messages.
    #[serde(rename = "chat:send")]
    ChatSend,
    /// Upload files.
    #[serde(rename = "file:upload")]
    FileUpload,
    /// Join a consultation.
    #[serde(rename = "consultation:join")]
    ConsultationJoin,
    /// Change an operator's verification status.
    #[serde(rename = "operator:verify")]
    OperatorVerify,
    /// Read operator statistics.
    #[serde(rename = "operator:stats")]
    OperatorStats,
}

impl Permission {
    /// Every permission.
    pub const ALL: [Permission; 7] = [
        Self::StreamCreate,
        Self::StreamJoin,
        Self::ChatSend,
        Self::FileUpload,
        Self::ConsultationJoin,
        Self::OperatorVerify,
        Self::OperatorStats,
    ];

    /// Stable string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StreamCreate => "stream:create",
            Self::StreamJoin => "stream:join",
            Self::ChatSend => "chat:send",
            Self::FileUpload => "file:upload",
            Self::ConsultationJoin => "consultation:join",
            Self::OperatorVerify => "operator:verify",
            Self::OperatorStats => "operator:stats",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("unknown permission '{s}'")))
    }
}
