//! Authentication service.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use gatekeeper_auth::{Claims, RevocationRegistry, TokenService};
use gatekeeper_core::error::AppError;
use gatekeeper_core::result::AppResult;
use gatekeeper_entity::Account;

use crate::account::AccountService;
use crate::validation::{LoginRequest, RegisterRequest};

const BEARER_PREFIX: &str = "Bearer ";

/// Tokens handed back after register, login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed access token.
    pub access_token: String,
    /// Signed refresh token.
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
    /// The authenticated account.
    pub account: Account,
}

/// Handles registration, login, refresh, logout and bearer authentication.
#[derive(Debug, Clone)]
pub struct AuthService {
    accounts: AccountService,
    tokens: TokenService,
    revocations: Arc<dyn RevocationRegistry>,
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(
        accounts: AccountService,
        tokens: TokenService,
        revocations: Arc<dyn RevocationRegistry>,
    ) -> Self {
        Self {
            accounts,
            tokens,
            revocations,
        }
    }

    /// Self-service registration. Admin accounts cannot be self-registered.
    pub async fn register(&self, req: RegisterRequest) -> AppResult<TokenResponse> {
        if req.role.trim().eq_ignore_ascii_case("admin") {
            return Err(AppError::forbidden());
        }
        let account = self.accounts.register(req).await?;
        self.respond(account)
    }

    /// Exchange credentials for a token pair.
    pub async fn login(&self, req: LoginRequest) -> AppResult<TokenResponse> {
        let account = self.accounts.authenticate(req).await?;
        info!(account_id = %account.id, "User logged in");
        self.respond(account)
    }

    /// Exchange a refresh token for a fresh pair.
    ///
    /// The account is re-read so the new access token reflects its current
    /// role and operator state. The presented refresh token is revoked.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<TokenResponse> {
        let claims = self.tokens.decode_refresh(refresh_token)?;
        if self.revocations.is_revoked(claims.jti) {
            debug!(jti = %claims.jti, "Refresh with revoked token");
            return Err(AppError::unauthorized());
        }

        let account = match self.accounts.find(claims.sub).await {
            Ok(account) if account.is_active => account,
            Ok(_) => return Err(AppError::unauthorized()),
            Err(e) if e.kind.is_internal() => return Err(e),
            Err(_) => return Err(AppError::unauthorized()),
        };

        // Only one concurrent refresh may consume the token.
        if !self.revocations.revoke_if_absent(claims.jti, claims.expires_at()) {
            debug!(jti = %claims.jti, "Refresh token already consumed");
            return Err(AppError::unauthorized());
        }
        debug!(account_id = %account.id, "Refresh token rotated");
        self.respond(account)
    }

    /// Revoke the access token, and the refresh token when given.
    ///
    /// Tokens that do not validate are ignored, so logging out twice is
    /// harmless.
    pub fn logout(&self, access_token: &str, refresh_token: Option<&str>) {
        if let Ok(claims) = self.tokens.validate_access(access_token) {
            self.revocations.revoke(claims.jti, claims.expires_at());
            info!(account_id = %claims.sub, jti = %claims.jti, "Access token revoked");
        }
        if let Some(Ok(claims)) = refresh_token.map(|t| self.tokens.decode_refresh(t)) {
            self.revocations.revoke(claims.jti, claims.expires_at());
            info!(account_id = %claims.sub, jti = %claims.jti, "Refresh token revoked");
        }
    }

    /// Authenticate an `Authorization` header value of the form
    /// `Bearer <token>`.
    pub fn authenticate(&self, authorization: &str) -> AppResult<Claims> {
        let token = authorization
            .strip_prefix(BEARER_PREFIX)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(AppError::unauthorized)?;
        self.authenticate_token(token)
    }

    /// Validate a raw access token and check it has not been revoked.
    pub fn authenticate_token(&self, token: &str) -> AppResult<Claims> {
        let claims = self.tokens.validate_access(token)?;
        if self.revocations.is_revoked(claims.jti) {
            debug!(jti = %claims.jti, "Revoked access token presented");
            return Err(AppError::unauthorized());
        }
        Ok(claims)
    }

    fn respond(&self, account: Account) -> AppResult<TokenResponse> {
        let pair = self.tokens.issue_pair(
            account.id,
            &account.email,
            account.role,
            account.operator_status,
            account.is_available,
        )?;
        Ok(TokenResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_in: pair.expires_in,
            account,
        })
    }
}
