//! Session admission state machine.

use std::sync::Arc;

use tracing::{debug, info, warn};

use gatekeeper_core::error::AppError;
use gatekeeper_core::result::AppResult;
use gatekeeper_core::traits::Clock;
use gatekeeper_core::types::AccountId;
use gatekeeper_entity::{
    Account, AccountRole, CreateSessionRequest, ParticipantRole, Session, SessionType,
};
use gatekeeper_store::{AccountStore, SessionStore};

use super::AdmissionDenial;
use super::locks::AccountLocks;

/// Arbitrates session creation against account capacity and operator state.
///
/// Every check-then-insert for an account runs while holding that
/// account's lock, and the insert itself is capacity-checked by the store,
/// so concurrent requests can never push the active count past
/// `max_sessions`. The account snapshot read here only drives the checks;
/// side effects go through column-scoped store writes so changes made by
/// other writers in the meantime are kept.
///
/// Closing sessions is not decided here; the owning system calls
/// [`SessionStore::mark_left`] when a participant leaves.
#[derive(Debug, Clone)]
pub struct SessionAdmissionController {
    accounts: Arc<dyn AccountStore>,
    sessions: Arc<dyn SessionStore>,
    locks: Arc<AccountLocks>,
    clock: Arc<dyn Clock>,
}

impl SessionAdmissionController {
    /// Creates a new controller.
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        sessions: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            accounts,
            sessions,
            locks: Arc::new(AccountLocks::new()),
            clock,
        }
    }

    /// Whether `account_id` may join the session identified by `external_id`.
    ///
    /// A rejoin of a session the account already holds is always allowed.
    /// Otherwise the same operator and capacity rules as [`Self::create_session`]
    /// apply. Never creates a session. A malformed id, a missing or an
    /// inactive account is a plain `false`; only store failures are errors.
    pub async fn validate_user_session(
        &self,
        account_id: &str,
        external_id: &str,
        participant_role: Option<ParticipantRole>,
    ) -> AppResult<bool> {
        let Ok(account_id) = AccountId::parse(account_id) else {
            debug!(account_id, "Session validation for malformed account id");
            return Ok(false);
        };

        let account = match self.accounts.find_by_id(account_id).await? {
            Some(account) if account.is_active => account,
            _ => return Ok(false),
        };

        if self
            .sessions
            .find_active_by_external_id(account_id, external_id)
            .await?
            .is_some()
        {
            debug!(%account_id, external_id, "Rejoin of active session allowed");
            return Ok(true);
        }

        let active = self.sessions.count_active(account_id).await?;
        if account.operator_gate_closed() {
            return Ok(false);
        }
        let allowed = active < capacity(&account);
        debug!(
            %account_id,
            external_id,
            participant_role = ?participant_role,
            active,
            allowed,
            "Session validation"
        );
        Ok(allowed)
    }

    /// Admit a new session for `account_id`.
    ///
    /// Refusals are precondition errors carrying an [`AdmissionDenial`]
    /// message. Reaching capacity also marks the account unavailable.
    pub async fn create_session(
        &self,
        account_id: &str,
        request: CreateSessionRequest,
    ) -> AppResult<Session> {
        let account_id = AccountId::parse(account_id)?;
        request.validate()?;

        let _guard = self.locks.acquire(account_id).await;

        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| AppError::not_found("account not found"))?;

        let active = self.sessions.count_active(account_id).await?;
        let client_stream =
            account.role == AccountRole::Client && request.session_type == SessionType::Streaming;

        if client_stream && active >= 1 {
            return Err(self.deny(&account, AdmissionDenial::StreamingLimit));
        }
        if account.operator_gate_closed() {
            return Err(self.deny(&account, AdmissionDenial::OperatorUnavailable));
        }
        if active >= capacity(&account) {
            return Err(self.reach_capacity(&account).await);
        }

        let now = self.clock.now();
        let session = Session::open(account_id, &request, now);
        let limit = if client_stream { 1 } else { capacity(&account) };

        if !self.sessions.insert_within_limit(&session, limit).await? {
            // Another process admitted a session between our count and insert.
            return Err(if client_stream {
                self.deny(&account, AdmissionDenial::StreamingLimit)
            } else {
                self.reach_capacity(&account).await
            });
        }

        self.accounts.record_session_joined(account_id, now).await?;

        info!(
            %account_id,
            session_id = %session.id,
            session_type = %session.session_type,
            external_id = %session.external_id,
            "Session admitted"
        );
        Ok(session)
    }

    fn deny(&self, account: &Account, denial: AdmissionDenial) -> AppError {
        warn!(account_id = %account.id, role = %account.role, reason = %denial, "Session refused");
        denial.into()
    }

    /// Mark the account unavailable and produce the capacity refusal.
    /// A failure to persist the flag is returned instead of the refusal.
    async fn reach_capacity(&self, account: &Account) -> AppError {
        if let Err(e) = self.accounts.mark_unavailable(account.id, self.clock.now()).await {
            return e;
        }
        warn!(
            account_id = %account.id,
            max_sessions = account.max_sessions,
            "Session capacity reached, account marked unavailable"
        );
        self.deny(account, AdmissionDenial::CapacityReached)
    }
}

fn capacity(account: &Account) -> u64 {
    u64::try_from(account.max_sessions).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    use gatekeeper_core::error::ErrorKind;
    use gatekeeper_core::traits::SystemClock;
    use gatekeeper_core::types::{PageRequest, PageResponse};
    use gatekeeper_entity::{NewAccount, OperatorStatus};
    use gatekeeper_store::memory::{MemoryAccountStore, MemorySessionStore};
    use gatekeeper_store::{AccountChange, OperatorStats};

    use super::*;

    struct Fixture {
        accounts: Arc<MemoryAccountStore>,
        sessions: Arc<MemorySessionStore>,
        controller: SessionAdmissionController,
    }

    fn fixture() -> Fixture {
        let accounts = Arc::new(MemoryAccountStore::new());
        let sessions = Arc::new(MemorySessionStore::new());
        let controller =
            SessionAdmissionController::new(accounts.clone(), sessions.clone(), Arc::new(SystemClock));
        Fixture {
            accounts,
            sessions,
            controller,
        }
    }

    async fn seed(fx: &Fixture, name: &str, role: AccountRole, max_sessions: i32) -> Account {
        let account = Account::new(
            NewAccount {
                username: name.to_string(),
                email: format!("{name}@example.com"),
                password_hash: "hash".to_string(),
                role,
                max_sessions,
            },
            Utc::now(),
        )
        .unwrap();
        fx.accounts.create(&account).await.unwrap();
        account
    }

    async fn overwrite(fx: &Fixture, account: &Account) {
        let replacement = account.clone();
        fx.accounts
            .modify(
                account.id,
                Box::new(move |stored| {
                    *stored = replacement;
                    Ok(())
                }),
            )
            .await
            .unwrap();
    }

    fn request(session_type: &str, external_id: &str) -> CreateSessionRequest {
        CreateSessionRequest::parse(session_type, external_id, "host").unwrap()
    }

    #[tokio::test]
    async fn client_streaming_scenario() {
        let fx = fixture();
        let a = seed(&fx, "a", AccountRole::Client, 1).await;
        let id = a.id.to_string();

        fx.controller
            .create_session(&id, request("streaming", "x"))
            .await
            .unwrap();

        let err = fx
            .controller
            .create_session(&id, request("streaming", "y"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Precondition);
        assert_eq!(err.message, AdmissionDenial::StreamingLimit.message());

        assert!(
            fx.controller
                .validate_user_session(&id, "x", Some(ParticipantRole::Host))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn client_may_add_consultation_but_not_second_stream() {
        let fx = fixture();
        let a = seed(&fx, "a", AccountRole::Client, 3).await;
        let id = a.id.to_string();

        fx.controller
            .create_session(&id, request("streaming", "s1"))
            .await
            .unwrap();
        let err = fx
            .controller
            .create_session(&id, request("streaming", "s2"))
            .await
            .unwrap_err();
        assert_eq!(err.message, AdmissionDenial::StreamingLimit.message());

        fx.controller
            .create_session(&id, request("consultation", "c1"))
            .await
            .unwrap();
        assert_eq!(fx.sessions.count_active(a.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn pending_operator_refused_regardless_of_availability() {
        let fx = fixture();
        let mut op = seed(&fx, "op", AccountRole::Operator, 5).await;
        let id = op.id.to_string();

        for available in [false, true] {
            op.is_available = available;
            overwrite(&fx, &op).await;

            let err = fx
                .controller
                .create_session(&id, request("consultation", "c"))
                .await
                .unwrap_err();
            assert_eq!(err.message, AdmissionDenial::OperatorUnavailable.message());
            assert!(!fx.controller.validate_user_session(&id, "c", None).await.unwrap());
        }
    }

    #[tokio::test]
    async fn verified_available_operator_admitted() {
        let fx = fixture();
        let mut op = seed(&fx, "op", AccountRole::Operator, 1).await;
        let now = Utc::now();
        op.set_operator_status(OperatorStatus::Verified, now).unwrap();
        op.set_availability(true, now).unwrap();
        overwrite(&fx, &op).await;

        let session = fx
            .controller
            .create_session(&op.id.to_string(), request("consultation", "c"))
            .await
            .unwrap();
        assert!(session.is_active());

        let stored = fx.accounts.find_by_id(op.id).await.unwrap().unwrap();
        assert_eq!(stored.total_sessions, 1);
        assert!(stored.is_online);
    }

    #[tokio::test]
    async fn capacity_refusal_marks_account_unavailable() {
        let fx = fixture();
        let mut op = seed(&fx, "op", AccountRole::Operator, 1).await;
        let now = Utc::now();
        op.set_operator_status(OperatorStatus::Verified, now).unwrap();
        op.set_availability(true, now).unwrap();
        overwrite(&fx, &op).await;

        // Admitted, then the operator re-opens availability by hand.
        fx.controller
            .create_session(&op.id.to_string(), request("consultation", "c1"))
            .await
            .unwrap();
        let mut stored = fx.accounts.find_by_id(op.id).await.unwrap().unwrap();
        stored.set_availability(true, now).unwrap();
        overwrite(&fx, &stored).await;

        let err = fx
            .controller
            .create_session(&op.id.to_string(), request("consultation", "c2"))
            .await
            .unwrap_err();
        assert_eq!(err.message, AdmissionDenial::CapacityReached.message());

        let stored = fx.accounts.find_by_id(op.id).await.unwrap().unwrap();
        assert!(!stored.is_available);
        assert_eq!(fx.sessions.count_active(op.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn malformed_and_unknown_ids() {
        let fx = fixture();

        let err = fx
            .controller
            .create_session("not-a-uuid", request("viewing", "v"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = fx
            .controller
            .create_session(&AccountId::new().to_string(), request("viewing", "v"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        assert!(!fx.controller.validate_user_session("garbage", "v", None).await.unwrap());
        assert!(
            !fx.controller
                .validate_user_session(&AccountId::new().to_string(), "v", None)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn inactive_account_fails_validation() {
        let fx = fixture();
        let mut a = seed(&fx, "a", AccountRole::Client, 2).await;
        a.deactivate(Utc::now());
        overwrite(&fx, &a).await;

        assert!(!fx.controller.validate_user_session(&a.id.to_string(), "x", None).await.unwrap());
    }

    #[tokio::test]
    async fn validation_is_idempotent_after_create() {
        let fx = fixture();
        let a = seed(&fx, "a", AccountRole::Client, 1).await;
        let id = a.id.to_string();
        fx.controller
            .create_session(&id, request("viewing", "room"))
            .await
            .unwrap();

        for _ in 0..3 {
            assert!(fx.controller.validate_user_session(&id, "room", None).await.unwrap());
        }
        // A different session would exceed capacity.
        assert!(!fx.controller.validate_user_session(&id, "other", None).await.unwrap());
        assert_eq!(fx.sessions.count_active(a.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn blank_external_id_rejected() {
        let fx = fixture();
        let a = seed(&fx, "a", AccountRole::Client, 1).await;
        let bad = CreateSessionRequest {
            session_type: SessionType::Viewing,
            external_id: " ".to_string(),
            participant_role: None,
        };
        let err = fx
            .controller
            .create_session(&a.id.to_string(), bad)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_admit_exactly_one() {
        let fx = fixture();
        let a = seed(&fx, "a", AccountRole::Client, 1).await;
        let id = a.id.to_string();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let controller = fx.controller.clone();
                let id = id.clone();
                tokio::spawn(async move {
                    controller
                        .create_session(&id, request("consultation", &format!("c{i}")))
                        .await
                })
            })
            .collect();

        let mut admitted = 0;
        let mut refused = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => admitted += 1,
                Err(e) => {
                    assert_eq!(e.kind, ErrorKind::Precondition);
                    refused += 1;
                }
            }
        }
        assert_eq!(admitted, 1);
        assert_eq!(refused, 7);
        assert_eq!(fx.sessions.count_active(a.id).await.unwrap(), 1);
    }

    /// Account store whose id lookups stall after reading, leaving a window
    /// for other writers between the controller's read and its writes.
    #[derive(Debug)]
    struct StalledReads {
        inner: Arc<MemoryAccountStore>,
        stall: Duration,
    }

    #[async_trait]
    impl AccountStore for StalledReads {
        async fn find_by_id(&self, id: AccountId) -> AppResult<Option<Account>> {
            let found = self.inner.find_by_id(id).await;
            tokio::time::sleep(self.stall).await;
            found
        }

        async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
            self.inner.find_by_email(email).await
        }

        async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>> {
            self.inner.find_by_username(username).await
        }

        async fn create(&self, account: &Account) -> AppResult<()> {
            self.inner.create(account).await
        }

        async fn modify(&self, id: AccountId, change: AccountChange<'_>) -> AppResult<Account> {
            self.inner.modify(id, change).await
        }

        async fn record_session_joined(&self, id: AccountId, at: DateTime<Utc>) -> AppResult<()> {
            self.inner.record_session_joined(id, at).await
        }

        async fn mark_unavailable(&self, id: AccountId, at: DateTime<Utc>) -> AppResult<()> {
            self.inner.mark_unavailable(id, at).await
        }

        async fn list(&self, page: PageRequest) -> AppResult<PageResponse<Account>> {
            self.inner.list(page).await
        }

        async fn list_available_operators(
            &self,
            page: PageRequest,
        ) -> AppResult<PageResponse<Account>> {
            self.inner.list_available_operators(page).await
        }

        async fn operator_stats(&self) -> AppResult<OperatorStats> {
            self.inner.operator_stats().await
        }
    }

    fn stalled_controller(fx: &Fixture) -> SessionAdmissionController {
        let accounts = Arc::new(StalledReads {
            inner: fx.accounts.clone(),
            stall: Duration::from_millis(100),
        });
        SessionAdmissionController::new(accounts, fx.sessions.clone(), Arc::new(SystemClock))
    }

    async fn open_operator(fx: &Fixture, name: &str, max_sessions: i32) -> Account {
        let mut op = seed(fx, name, AccountRole::Operator, max_sessions).await;
        let now = Utc::now();
        op.set_operator_status(OperatorStatus::Verified, now).unwrap();
        op.set_availability(true, now).unwrap();
        overwrite(fx, &op).await;
        op
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn operator_block_during_admission_is_kept() {
        let fx = fixture();
        let op = open_operator(&fx, "op", 2).await;
        let controller = stalled_controller(&fx);

        let id = op.id.to_string();
        let admission = tokio::spawn(async move {
            controller
                .create_session(&id, request("consultation", "c1"))
                .await
        });

        tokio::time::sleep(Duration::from_millis(30)).await;
        fx.accounts
            .modify(
                op.id,
                Box::new(|a| a.set_operator_status(OperatorStatus::Blocked, Utc::now())),
            )
            .await
            .unwrap();

        // The admission read the account before the block landed.
        admission.await.unwrap().unwrap();

        let stored = fx.accounts.find_by_id(op.id).await.unwrap().unwrap();
        assert_eq!(stored.operator_status, Some(OperatorStatus::Blocked));
        assert_eq!(stored.total_sessions, 1);
        assert!(stored.is_online);

        let err = fx
            .controller
            .create_session(&op.id.to_string(), request("consultation", "c2"))
            .await
            .unwrap_err();
        assert_eq!(err.message, AdmissionDenial::OperatorUnavailable.message());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn deactivation_during_capacity_refusal_is_kept() {
        let fx = fixture();
        let op = open_operator(&fx, "op", 1).await;
        fx.controller
            .create_session(&op.id.to_string(), request("consultation", "c1"))
            .await
            .unwrap();
        fx.accounts
            .modify(op.id, Box::new(|a| a.set_availability(true, Utc::now())))
            .await
            .unwrap();

        let controller = stalled_controller(&fx);
        let id = op.id.to_string();
        let admission = tokio::spawn(async move {
            controller
                .create_session(&id, request("consultation", "c2"))
                .await
        });

        tokio::time::sleep(Duration::from_millis(30)).await;
        fx.accounts
            .modify(
                op.id,
                Box::new(|a| {
                    a.deactivate(Utc::now());
                    Ok(())
                }),
            )
            .await
            .unwrap();

        let err = admission.await.unwrap().unwrap_err();
        assert_eq!(err.message, AdmissionDenial::CapacityReached.message());

        let stored = fx.accounts.find_by_id(op.id).await.unwrap().unwrap();
        assert!(!stored.is_active);
        assert!(!stored.is_available);
        assert_eq!(stored.total_sessions, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn admissions_from_separate_controllers_count_every_join() {
        let fx = fixture();
        let a = seed(&fx, "a", AccountRole::Client, 8).await;
        // Separate controllers hold separate locks, as separate processes would.
        let controllers = [
            fx.controller.clone(),
            SessionAdmissionController::new(
                fx.accounts.clone(),
                fx.sessions.clone(),
                Arc::new(SystemClock),
            ),
        ];

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let controller = controllers[i % 2].clone();
                let id = a.id.to_string();
                tokio::spawn(async move {
                    controller
                        .create_session(&id, request("consultation", &format!("c{i}")))
                        .await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = fx.accounts.find_by_id(a.id).await.unwrap().unwrap();
        assert_eq!(stored.total_sessions, 8);
        assert_eq!(fx.sessions.count_active(a.id).await.unwrap(), 8);
    }
}
