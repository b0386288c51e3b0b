//! Authentication configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::duration::parse_duration_or;

/// Secret shipped in the default configuration; rejected in production.
pub const DEFAULT_JWT_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// Default access token lifetime.
pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(15 * 60);

/// Default refresh token lifetime.
pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(168 * 60 * 60);

/// Token signing and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for token signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Access token lifetime, e.g. `"15m"`.
    #[serde(default = "default_access_ttl")]
    pub access_ttl: String,
    /// Refresh token lifetime, e.g. `"168h"`.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl: String,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
}

impl AuthConfig {
    /// Parsed access token lifetime, falling back to 15 minutes.
    pub fn access_ttl(&self) -> Duration {
        parse_duration_or(&self.access_ttl, DEFAULT_ACCESS_TTL, "auth.access_ttl")
    }

    /// Parsed refresh token lifetime, falling back to 168 hours.
    pub fn refresh_ttl(&self) -> Duration {
        parse_duration_or(&self.refresh_ttl, DEFAULT_REFRESH_TTL, "auth.refresh_ttl")
    }

    /// Whether the signing secret is unset or still the shipped default.
    pub fn has_default_secret(&self) -> bool {
        self.jwt_secret.trim().is_empty() || self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            access_ttl: default_access_ttl(),
            refresh_ttl: default_refresh_ttl(),
            password_min_length: default_password_min(),
        }
    }
}

fn default_jwt_secret() -> String {
    DEFAULT_JWT_SECRET.to_string()
}

fn default_access_ttl() -> String {
    "15m".to_string()
}

fn default_refresh_ttl() -> String {
    "168h".to_string()
}

fn default_password_min() -> usize {
    6
}
