//! Token issuance and validation.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use gatekeeper_core::config::auth::{AuthConfig, DEFAULT_ACCESS_TTL, DEFAULT_REFRESH_TTL};
use gatekeeper_core::config::duration::parse_duration_or;
use gatekeeper_core::error::AppError;
use gatekeeper_core::traits::Clock;
use gatekeeper_core::types::AccountId;
use gatekeeper_entity::{AccountRole, OperatorStatus};

use super::claims::{Claims, RefreshClaims, TokenPair, TokenType};
use super::decoder::JwtDecoder;
use super::encoder::JwtEncoder;
use crate::rbac::RbacPolicies;

/// Issues and validates access/refresh token pairs.
///
/// Validation checks algorithm, signature, token type and expiry against
/// the injected clock. It does not consult revocation; callers combine it
/// with a [`crate::RevocationRegistry`].
#[derive(Debug, Clone)]
pub struct TokenService {
    encoder: JwtEncoder,
    decoder: JwtDecoder,
    policies: RbacPolicies,
    access_ttl: Duration,
    refresh_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Build a service from a secret and TTL strings such as `"15m"`.
    ///
    /// Unparseable TTLs fall back to 15 minutes (access) and 168 hours
    /// (refresh).
    pub fn configure(
        secret: &str,
        access_ttl: &str,
        refresh_ttl: &str,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            encoder: JwtEncoder::new(secret),
            decoder: JwtDecoder::new(secret),
            policies: RbacPolicies::new(),
            access_ttl: parse_duration_or(access_ttl, DEFAULT_ACCESS_TTL, "access_ttl"),
            refresh_ttl: parse_duration_or(refresh_ttl, DEFAULT_REFRESH_TTL, "refresh_ttl"),
            clock,
        }
    }

    /// Build a service from the `auth` configuration section.
    pub fn from_config(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self::configure(&config.jwt_secret, &config.access_ttl, &config.refresh_ttl, clock)
    }

    /// Configured access token lifetime.
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Configured refresh token lifetime.
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Issue a fresh access/refresh pair. Permissions are copied from the
    /// role's policy; each token gets its own id.
    pub fn issue_pair(
        &self,
        account_id: AccountId,
        email: &str,
        role: AccountRole,
        operator_status: Option<OperatorStatus>,
        is_available: bool,
    ) -> Result<TokenPair, AppError> {
        let now = self.clock.now();
        let access_expires_at = now + to_chrono(self.access_ttl)?;
        let refresh_expires_at = now + to_chrono(self.refresh_ttl)?;

        let access = Claims {
            jti: Uuid::new_v4(),
            sub: account_id,
            email: email.to_string(),
            role,
            operator_status,
            is_available,
            permissions: self.policies.permissions_for(role).to_vec(),
            iat: now.timestamp(),
            exp: access_expires_at.timestamp(),
            token_type: TokenType::Access,
        };
        let refresh = RefreshClaims {
            jti: Uuid::new_v4(),
            sub: account_id,
            iat: now.timestamp(),
            exp: refresh_expires_at.timestamp(),
            token_type: TokenType::Refresh,
        };

        let pair = TokenPair {
            access_token: self.encoder.sign(&access)?,
            refresh_token: self.encoder.sign(&refresh)?,
            expires_in: self.access_ttl.as_secs(),
            access_expires_at,
            refresh_expires_at,
        };
        debug!(account_id = %account_id, %role, access_jti = %access.jti, "Issued token pair");
        Ok(pair)
    }

    /// Validate an access token and return its claims.
    pub fn validate_access(&self, token: &str) -> Result<Claims, AppError> {
        let claims: Claims = self.decoder.verify(token)?;
        self.check(claims.token_type, TokenType::Access, claims.exp)?;
        Ok(claims)
    }

    /// Validate a refresh token and return its full claims.
    pub fn decode_refresh(&self, token: &str) -> Result<RefreshClaims, AppError> {
        let claims: RefreshClaims = self.decoder.verify(token)?;
        self.check(claims.token_type, TokenType::Refresh, claims.exp)?;
        Ok(claims)
    }

    /// Validate a refresh token and return its subject.
    pub fn validate_refresh(&self, token: &str) -> Result<AccountId, AppError> {
        self.decode_refresh(token).map(|claims| claims.sub)
    }

    fn check(&self, actual: TokenType, expected: TokenType, exp: i64) -> Result<(), AppError> {
        if actual != expected {
            debug!(?actual, ?expected, "Token type mismatch");
            return Err(AppError::unauthorized());
        }
        if exp <= self.clock.now().timestamp() {
            debug!(exp, "Token expired");
            return Err(AppError::unauthorized());
        }
        Ok(())
    }
}

fn to_chrono(d: Duration) -> Result<chrono::Duration, AppError> {
    chrono::Duration::from_std(d).map_err(|_| AppError::internal("token lifetime out of range"))
}
