//! Integration tests for logout and revocation sweeping.

use chrono::Duration;

use gatekeeper_core::error::TransportStatus;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_logout_revokes_access_token() {
    let app = TestApp::new();
    let resp = app.register("user@example.com", "").await;
    let header = format!("Bearer {}", resp.access_token);
    assert!(app.services.auth.authenticate(&header).is_ok());

    app.services.auth.logout(&resp.access_token, None);
    let err = app.services.auth.authenticate(&header).unwrap_err();
    assert_eq!(err.status(), TransportStatus::Unauthenticated);

    // Other sessions of the same account are unaffected.
    let other = app.services.auth.refresh(&resp.refresh_token).await.unwrap();
    assert!(app.services.auth.authenticate_token(&other.access_token).is_ok());
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let app = TestApp::new();
    let resp = app.register("user@example.com", "").await;

    app.services.auth.logout(&resp.access_token, None);
    app.services.auth.logout(&resp.access_token, None);
    app.services.auth.logout("not-a-token", None);
    assert_eq!(app.services.revocations.len(), 1);
}

#[tokio::test]
async fn test_revocation_lapses_with_token_expiry() {
    let app = TestApp::new();
    let resp = app.register("user@example.com", "").await;
    let claims = app.claims(&resp);
    app.services.auth.logout(&resp.access_token, Some(&resp.refresh_token));

    let registry = &app.services.revocations;
    assert!(registry.is_revoked(claims.jti));

    app.clock.advance(Duration::minutes(15));
    assert!(!registry.is_revoked(claims.jti));
    assert_eq!(app.services.revocation_sweeper().run_once(), 1);
    assert_eq!(registry.len(), 1);

    app.clock.advance(Duration::hours(168));
    assert_eq!(app.services.revocation_sweeper().run_once(), 1);
    assert!(registry.is_empty());
}
