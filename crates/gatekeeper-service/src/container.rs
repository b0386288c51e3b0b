//! Wiring of a complete service set.

use std::sync::Arc;
use std::time::Duration;

use gatekeeper_auth::{
    MemoryRevocationRegistry, PasswordHasher, RbacEnforcer, RevocationRegistry, RevocationSweeper,
    TokenService,
};
use tracing::info;

use gatekeeper_core::config::AppConfig;
use gatekeeper_core::result::AppResult;
use gatekeeper_core::traits::Clock;
use gatekeeper_store::memory::{MemoryAccountStore, MemorySessionStore};
use gatekeeper_store::postgres::{DatabasePool, PgAccountStore, PgSessionStore};
use gatekeeper_store::{AccountStore, SessionStore};

use crate::account::{AccountPolicy, AccountService};
use crate::admission::SessionAdmissionController;
use crate::auth::AuthService;
use crate::operator::OperatorService;
use crate::presence::PresenceService;
use crate::session::SessionService;

/// Every service, sharing one set of stores, one clock and one
/// revocation registry.
#[derive(Debug, Clone)]
pub struct Services {
    /// Account lifecycle.
    pub accounts: AccountService,
    /// Login, refresh, logout and bearer authentication.
    pub auth: AuthService,
    /// Session admission.
    pub admission: SessionAdmissionController,
    /// Operator management.
    pub operators: OperatorService,
    /// Presence updates.
    pub presence: PresenceService,
    /// Session listing.
    pub sessions: SessionService,
    /// Token issuance and validation.
    pub tokens: TokenService,
    /// Revoked token ids.
    pub revocations: Arc<dyn RevocationRegistry>,
    sweep_interval: Duration,
}

impl Services {
    /// Build services over the given stores.
    pub fn new(
        config: &AppConfig,
        account_store: Arc<dyn AccountStore>,
        session_store: Arc<dyn SessionStore>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let tokens = TokenService::from_config(&config.auth, clock.clone());
        let revocations: Arc<dyn RevocationRegistry> =
            Arc::new(MemoryRevocationRegistry::new(clock.clone()));
        let accounts = AccountService::new(
            account_store.clone(),
            hasher,
            AccountPolicy::from_config(config),
            clock.clone(),
        );

        Self {
            auth: AuthService::new(accounts.clone(), tokens.clone(), revocations.clone()),
            admission: SessionAdmissionController::new(
                account_store.clone(),
                session_store.clone(),
                clock.clone(),
            ),
            operators: OperatorService::new(account_store.clone(), RbacEnforcer::new(), clock.clone()),
            presence: PresenceService::new(account_store, clock),
            sessions: SessionService::new(session_store),
            accounts,
            tokens,
            revocations,
            sweep_interval: Duration::from_secs(config.session.revocation_sweep_interval_seconds),
        }
    }

    /// Build services over fresh in-memory stores.
    pub fn in_memory(
        config: &AppConfig,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(
            config,
            Arc::new(MemoryAccountStore::new()),
            Arc::new(MemorySessionStore::new()),
            hasher,
            clock,
        )
    }

    /// Build services over PostgreSQL when `database.url` is set, and over
    /// in-memory stores otherwise.
    pub async fn connect(
        config: &AppConfig,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Self> {
        if !config.database.is_configured() {
            info!("No database configured, using in-memory stores");
            return Ok(Self::in_memory(config, hasher, clock));
        }

        let db = DatabasePool::connect(&config.database).await?;
        Ok(Self::new(
            config,
            Arc::new(PgAccountStore::new(&db)),
            Arc::new(PgSessionStore::new(&db)),
            hasher,
            clock,
        ))
    }

    /// A sweeper for this set's revocation registry on the configured
    /// interval.
    ///
    /// Nothing spawns it for you. A long-running host (the request server
    /// embedding these services) runs it next to its listener:
    ///
    /// ```ignore
    /// let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    /// let sweeper = services.revocation_sweeper().spawn(shutdown_rx);
    /// ```
    ///
    /// The one-shot CLI never keeps a registry alive long enough to need it.
    pub fn revocation_sweeper(&self) -> RevocationSweeper {
        RevocationSweeper::new(self.revocations.clone(), self.sweep_interval)
    }
}
