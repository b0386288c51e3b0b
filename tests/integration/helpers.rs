//! Shared test helpers for integration tests.

use std::sync::Arc;

use argon2::Params;

use gatekeeper_auth::{Argon2Hasher, Claims};
use gatekeeper_core::config::AppConfig;
use gatekeeper_core::traits::ManualClock;
use gatekeeper_entity::{CreateSessionRequest, ParticipantRole, SessionType};
use gatekeeper_service::validation::{LoginRequest, RegisterRequest};
use gatekeeper_service::{Services, TokenResponse};

pub const PASSWORD: &str = "password123";

/// Test application context
pub struct TestApp {
    /// Every service, over fresh in-memory stores
    pub services: Services,
    /// The clock shared by all services
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    /// Default configuration: one session per account.
    pub fn new() -> Self {
        Self::with_max_sessions(1)
    }

    /// Accounts registered through this app get `max_sessions` capacity.
    pub fn with_max_sessions(max_sessions: i32) -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "integration-secret".to_string();
        config.session.default_max_sessions = max_sessions;

        let clock = Arc::new(ManualClock::starting_now());
        let hasher = Arc::new(Argon2Hasher::with_params(
            Params::new(1024, 1, 1, None).expect("valid argon2 params"),
        ));
        let services = Services::in_memory(&config, hasher, clock.clone());
        Self { services, clock }
    }

    /// Self-register an account and return its tokens.
    pub async fn register(&self, email: &str, role: &str) -> TokenResponse {
        self.services
            .auth
            .register(register_request(email, role))
            .await
            .expect("registration succeeds")
    }

    /// Provision an admin and log it in, returning its validated claims.
    pub async fn admin(&self) -> Claims {
        self.services
            .accounts
            .register(register_request("admin@example.com", "admin"))
            .await
            .expect("admin provisioning succeeds");
        let resp = self
            .services
            .auth
            .login(LoginRequest {
                email: "admin@example.com".to_string(),
                password: PASSWORD.to_string(),
            })
            .await
            .expect("admin login succeeds");
        self.claims(&resp)
    }

    /// Register an operator, verify it and mark it available.
    pub async fn open_operator(&self, email: &str) -> TokenResponse {
        let admin = self.admin_claims_or_create().await;
        let resp = self.register(email, "operator").await;
        let id = resp.account.id.to_string();
        self.services
            .operators
            .verify_operator(&admin, &id, "verified")
            .await
            .expect("verification succeeds");
        self.services
            .operators
            .update_availability(&admin, &id, true)
            .await
            .expect("availability update succeeds");
        resp
    }

    /// Authenticate the access token of `resp`.
    pub fn claims(&self, resp: &TokenResponse) -> Claims {
        self.services
            .auth
            .authenticate(&format!("Bearer {}", resp.access_token))
            .expect("token authenticates")
    }

    async fn admin_claims_or_create(&self) -> Claims {
        match self
            .services
            .auth
            .login(LoginRequest {
                email: "admin@example.com".to_string(),
                password: PASSWORD.to_string(),
            })
            .await
        {
            Ok(resp) => self.claims(&resp),
            Err(_) => self.admin().await,
        }
    }
}

pub fn register_request(email: &str, role: &str) -> RegisterRequest {
    RegisterRequest {
        username: String::new(),
        email: email.to_string(),
        password: PASSWORD.to_string(),
        role: role.to_string(),
    }
}

pub fn session(kind: SessionType, external_id: &str) -> CreateSessionRequest {
    CreateSessionRequest {
        session_type: kind,
        external_id: external_id.to_string(),
        participant_role: Some(ParticipantRole::Host),
    }
}
