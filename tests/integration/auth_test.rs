//! Integration tests for the authentication flow.

use chrono::Duration;

use gatekeeper_auth::Permission;
use gatekeeper_core::error::{ErrorKind, TransportStatus};
use gatekeeper_entity::{AccountRole, OperatorStatus};
use gatekeeper_service::validation::LoginRequest;

use crate::helpers::{PASSWORD, TestApp, register_request};

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new();
    app.register("user@example.com", "").await;

    let resp = app
        .services
        .auth
        .login(LoginRequest {
            email: "user@example.com".to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap();
    assert!(!resp.access_token.is_empty());
    assert!(!resp.refresh_token.is_empty());
    assert_eq!(resp.expires_in, 15 * 60);
    assert_eq!(resp.account.role, AccountRole::Client);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new();
    app.register("user@example.com", "").await;

    let wrong = app
        .services
        .auth
        .login(LoginRequest {
            email: "user@example.com".to_string(),
            password: "wrongpassword".to_string(),
        })
        .await
        .unwrap_err();
    let missing = app
        .services
        .auth
        .login(LoginRequest {
            email: "nobody@example.com".to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap_err();

    assert_eq!(wrong.status(), TransportStatus::Unauthenticated);
    assert_eq!(wrong.message, missing.message);
    assert_eq!(wrong.public_message(), "unauthorized");
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = TestApp::new();
    app.register("dup@example.com", "").await;
    let err = app
        .services
        .auth
        .register(register_request("dup@example.com", ""))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(err.status().http_code(), 409);
}

#[tokio::test]
async fn test_invalid_registration_input() {
    let app = TestApp::new();
    for (email, role) in [("not-an-email", ""), ("ok@example.com", "superuser")] {
        let err = app
            .services
            .auth
            .register(register_request(email, role))
            .await
            .unwrap_err();
        assert_eq!(err.status(), TransportStatus::InvalidArgument, "{email} {role}");
    }
}

#[tokio::test]
async fn test_claims_match_account() {
    let app = TestApp::new();
    let resp = app.register("op@example.com", "operator").await;
    let claims = app.claims(&resp);

    assert_eq!(claims.sub, resp.account.id);
    assert_eq!(claims.email, "op@example.com");
    assert_eq!(claims.role, AccountRole::Operator);
    assert_eq!(claims.operator_status, Some(OperatorStatus::Pending));
    assert!(claims.has_permission(Permission::ConsultationJoin));
    assert!(!claims.has_permission(Permission::OperatorVerify));
}

#[tokio::test]
async fn test_access_token_expires() {
    let app = TestApp::new();
    let resp = app.register("user@example.com", "").await;
    let header = format!("Bearer {}", resp.access_token);

    app.clock.advance(Duration::minutes(15) - Duration::seconds(1));
    assert!(app.services.auth.authenticate(&header).is_ok());

    app.clock.advance(Duration::seconds(1));
    let err = app.services.auth.authenticate(&header).unwrap_err();
    assert_eq!(err.status(), TransportStatus::Unauthenticated);
}

#[tokio::test]
async fn test_refresh_picks_up_new_operator_state() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let resp = app.register("op@example.com", "operator").await;
    assert_eq!(app.claims(&resp).operator_status, Some(OperatorStatus::Pending));

    app.services
        .operators
        .verify_operator(&admin, &resp.account.id.to_string(), "verified")
        .await
        .unwrap();

    // The old token keeps its snapshot until refreshed.
    assert_eq!(app.claims(&resp).operator_status, Some(OperatorStatus::Pending));

    let refreshed = app.services.auth.refresh(&resp.refresh_token).await.unwrap();
    assert_eq!(
        app.claims(&refreshed).operator_status,
        Some(OperatorStatus::Verified)
    );
}

#[tokio::test]
async fn test_refresh_rejected_for_deactivated_account() {
    let app = TestApp::new();
    let resp = app.register("gone@example.com", "").await;
    app.services
        .accounts
        .deactivate(&resp.account.id.to_string())
        .await
        .unwrap();

    let err = app.services.auth.refresh(&resp.refresh_token).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
}
