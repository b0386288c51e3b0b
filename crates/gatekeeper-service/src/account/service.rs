//! Account lifecycle operations.

use std::sync::Arc;

use tracing::info;

use gatekeeper_auth::PasswordHasher;
use gatekeeper_core::config::AppConfig;
use gatekeeper_core::error::AppError;
use gatekeeper_core::result::AppResult;
use gatekeeper_core::traits::Clock;
use gatekeeper_core::types::{AccountId, PageRequest, PageResponse};
use gatekeeper_entity::{Account, AccountRole, NewAccount};
use gatekeeper_store::AccountStore;

use crate::validation::{
    self, LoginRequest, RegisterRequest, UpdateProfileRequest, check_password_length,
};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Settings applied when creating accounts and changing passwords.
#[derive(Debug, Clone, Copy)]
pub struct AccountPolicy {
    /// Minimum password length in characters.
    pub password_min_length: usize,
    /// Session capacity given to new accounts.
    pub default_max_sessions: i32,
}

impl AccountPolicy {
    /// Read the policy from configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            password_min_length: config.auth.password_min_length,
            default_max_sessions: config.session.default_max_sessions,
        }
    }
}

impl Default for AccountPolicy {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Registers accounts, checks credentials and edits profiles.
#[derive(Debug, Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountStore>,
    hasher: Arc<dyn PasswordHasher>,
    policy: AccountPolicy,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    /// Creates a new account service.
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        hasher: Arc<dyn PasswordHasher>,
        policy: AccountPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            hasher,
            policy,
            clock,
        }
    }

    /// Create an account.
    ///
    /// An empty username defaults to the email and an empty role to
    /// `client`. Operators start `pending` and unavailable.
    pub async fn register(&self, req: RegisterRequest) -> AppResult<Account> {
        validation::check(&req)?;
        check_password_length(&req.password, self.policy.password_min_length)?;

        let role = if req.role.is_empty() {
            AccountRole::Client
        } else {
            req.role.parse()?
        };
        let username = if req.username.trim().is_empty() {
            req.email.clone()
        } else {
            req.username
        };

        if self.accounts.find_by_email(&req.email).await?.is_some()
            || self.accounts.find_by_username(&username).await?.is_some()
        {
            return Err(AppError::conflict("account already exists"));
        }

        let account = Account::new(
            NewAccount {
                username,
                email: req.email,
                password_hash: self.hasher.hash(&req.password)?,
                role,
                max_sessions: self.policy.default_max_sessions,
            },
            self.clock.now(),
        )?;
        self.accounts.create(&account).await?;

        info!(account_id = %account.id, %role, "Account registered");
        Ok(account)
    }

    /// Check credentials. Unknown email, inactive account and wrong
    /// password are indistinguishable to the caller.
    pub async fn authenticate(&self, req: LoginRequest) -> AppResult<Account> {
        validation::check(&req)?;

        let Some(account) = self.accounts.find_by_email(&req.email).await? else {
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        };
        if !account.is_active || !self.hasher.verify(&req.password, &account.password_hash)? {
            info!(account_id = %account.id, "Login refused");
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        }
        Ok(account)
    }

    /// Fetch an account.
    pub async fn get(&self, account_id: &str) -> AppResult<Account> {
        let id = AccountId::parse(account_id)?;
        self.find(id).await
    }

    pub(crate) async fn find(&self, id: AccountId) -> AppResult<Account> {
        self.accounts
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("account not found"))
    }

    /// Change username, email or password.
    pub async fn update_profile(
        &self,
        account_id: &str,
        req: UpdateProfileRequest,
    ) -> AppResult<Account> {
        let id = AccountId::parse(account_id)?;
        validation::check(&req)?;
        let current = self.find(id).await?;

        let username = req.username.filter(|u| *u != current.username);
        if let Some(username) = &username {
            if self.accounts.find_by_username(username).await?.is_some() {
                return Err(AppError::conflict("username already taken"));
            }
        }
        let email = req.email.filter(|e| *e != current.email);
        if let Some(email) = &email {
            if self.accounts.find_by_email(email).await?.is_some() {
                return Err(AppError::conflict("email already registered"));
            }
        }
        let password_hash = match req.password {
            Some(password) => {
                check_password_length(&password, self.policy.password_min_length)?;
                Some(self.hasher.hash(&password)?)
            }
            None => None,
        };

        // The store re-checks uniqueness against writes that landed since.
        let now = self.clock.now();
        let account = self
            .accounts
            .modify(
                id,
                Box::new(move |account| {
                    if let Some(username) = username {
                        account.username = username;
                    }
                    if let Some(email) = email {
                        account.email = email;
                    }
                    if let Some(hash) = password_hash {
                        account.password_hash = hash;
                    }
                    account.updated_at = now;
                    Ok(())
                }),
            )
            .await?;
        info!(account_id = %account.id, "Profile updated");
        Ok(account)
    }

    /// Retire an account. It can no longer log in or pass session validation.
    pub async fn deactivate(&self, account_id: &str) -> AppResult<Account> {
        let id = AccountId::parse(account_id)?;
        let now = self.clock.now();
        let account = self
            .accounts
            .modify(
                id,
                Box::new(move |account| {
                    account.deactivate(now);
                    Ok(())
                }),
            )
            .await?;
        info!(account_id = %account.id, "Account deactivated");
        Ok(account)
    }

    /// List accounts, oldest first.
    pub async fn list(&self, page: PageRequest) -> AppResult<PageResponse<Account>> {
        self.accounts.list(page).await
    }
}
