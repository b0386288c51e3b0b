//! Integration tests for operator management and role gating.

use gatekeeper_core::error::{ErrorKind, TransportStatus};
use gatekeeper_core::traits::Clock;
use gatekeeper_core::types::PageRequest;
use gatekeeper_entity::{OperatorStatus, SessionType};

use crate::helpers::{TestApp, session};

#[tokio::test]
async fn test_verified_operator_can_take_sessions() {
    let app = TestApp::with_max_sessions(2);
    let op = app.open_operator("op@example.com").await;
    let id = op.account.id.to_string();

    app.services
        .admission
        .create_session(&id, session(SessionType::Consultation, "room"))
        .await
        .unwrap();

    let available = app
        .services
        .operators
        .list_available(PageRequest::default())
        .await
        .unwrap();
    assert_eq!(available.total_items, 1);
    assert_eq!(available.items[0].id, op.account.id);
}

#[tokio::test]
async fn test_blocked_operator_is_refused() {
    let app = TestApp::with_max_sessions(2);
    let admin = app.admin().await;
    let op = app.open_operator("op@example.com").await;
    let id = op.account.id.to_string();

    let blocked = app
        .services
        .operators
        .verify_operator(&admin, &id, "blocked")
        .await
        .unwrap();
    assert_eq!(blocked.operator_status, Some(OperatorStatus::Blocked));
    assert!(blocked.is_available);

    let err = app
        .services
        .admission
        .create_session(&id, session(SessionType::Consultation, "room"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Precondition);
}

#[tokio::test]
async fn test_verification_requires_permission() {
    let app = TestApp::new();
    let op = app.register("op@example.com", "operator").await;
    let client = app.register("c@example.com", "client").await;

    let err = app
        .services
        .operators
        .verify_operator(&app.claims(&client), &op.account.id.to_string(), "verified")
        .await
        .unwrap_err();
    assert_eq!(err.status(), TransportStatus::PermissionDenied);
    assert_eq!(err.status().http_code(), 403);
}

#[tokio::test]
async fn test_operator_toggles_own_availability() {
    let app = TestApp::new();
    let op = app.register("op@example.com", "operator").await;
    let claims = app.claims(&op);

    let updated = app
        .services
        .operators
        .update_availability(&claims, &op.account.id.to_string(), true)
        .await
        .unwrap();
    assert!(updated.is_available);

    // Still pending, so admission stays closed.
    let err = app
        .services
        .admission
        .create_session(
            &op.account.id.to_string(),
            session(SessionType::Consultation, "room"),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Precondition);
}

#[tokio::test]
async fn test_stats_counts_by_status() {
    let app = TestApp::new();
    let admin = app.admin().await;
    app.open_operator("a@example.com").await;
    app.register("b@example.com", "operator").await;
    app.register("c@example.com", "client").await;

    let stats = app.services.operators.stats(&admin).await.unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.verified, 1);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.blocked, 0);
    assert_eq!(stats.available, 1);
}

#[tokio::test]
async fn test_presence_updates() {
    let app = TestApp::new();
    let client = app.register("c@example.com", "client").await;
    let id = client.account.id.to_string();

    let online = app.services.presence.update_presence(&id, true).await.unwrap();
    assert!(online.is_online);
    assert_eq!(online.last_seen_at, Some(app.clock.now()));

    let offline = app.services.presence.update_presence(&id, false).await.unwrap();
    assert!(!offline.is_online);
}
