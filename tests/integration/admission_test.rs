//! Integration tests for session admission.

use std::sync::Arc;

use gatekeeper_core::error::{ErrorKind, TransportStatus};
use gatekeeper_entity::{OperatorStatus, ParticipantRole, SessionType};
use gatekeeper_service::AdmissionDenial;

use crate::helpers::{TestApp, session};

#[tokio::test]
async fn test_client_streaming_scenario() {
    let app = TestApp::new();
    let client = app.register("a@example.com", "client").await;
    let id = client.account.id.to_string();
    let admission = &app.services.admission;

    admission
        .create_session(&id, session(SessionType::Streaming, "x"))
        .await
        .unwrap();

    let err = admission
        .create_session(&id, session(SessionType::Streaming, "y"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), TransportStatus::FailedPrecondition);
    assert_eq!(err.message, AdmissionDenial::StreamingLimit.message());

    assert!(
        admission
            .validate_user_session(&id, "x", Some(ParticipantRole::Host))
            .await
            .unwrap()
    );
    assert!(
        !admission
            .validate_user_session(&id, "y", Some(ParticipantRole::Host))
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_streaming_limit_independent_of_capacity() {
    let app = TestApp::with_max_sessions(3);
    let client = app.register("c@example.com", "client").await;
    let id = client.account.id.to_string();
    let admission = &app.services.admission;

    admission
        .create_session(&id, session(SessionType::Streaming, "s1"))
        .await
        .unwrap();
    let err = admission
        .create_session(&id, session(SessionType::Streaming, "s2"))
        .await
        .unwrap_err();
    assert_eq!(err.message, AdmissionDenial::StreamingLimit.message());

    admission
        .create_session(&id, session(SessionType::Consultation, "c1"))
        .await
        .unwrap();

    let active = app.services.sessions.active_sessions(&id).await.unwrap();
    assert_eq!(active.len(), 2);
}

#[tokio::test]
async fn test_pending_operator_refused() {
    let app = TestApp::with_max_sessions(5);
    let op = app.register("op@example.com", "operator").await;
    let id = op.account.id.to_string();

    let err = app
        .services
        .admission
        .create_session(&id, session(SessionType::Consultation, "room"))
        .await
        .unwrap_err();
    assert_eq!(err.message, AdmissionDenial::OperatorUnavailable.message());
    assert!(
        !app.services
            .admission
            .validate_user_session(&id, "room", None)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_capacity_marks_account_unavailable() {
    let app = TestApp::new();
    let op = app.open_operator("op@example.com").await;
    let id = op.account.id.to_string();
    let admission = &app.services.admission;

    admission
        .create_session(&id, session(SessionType::Consultation, "r1"))
        .await
        .unwrap();

    // The first refusal is on capacity and flips availability off.
    let err = admission
        .create_session(&id, session(SessionType::Consultation, "r2"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Precondition);
    assert_eq!(err.message, AdmissionDenial::CapacityReached.message());
    assert!(!app.services.accounts.get(&id).await.unwrap().is_available);

    // From now on the operator gate closes first.
    let err = admission
        .create_session(&id, session(SessionType::Consultation, "r3"))
        .await
        .unwrap_err();
    assert_eq!(err.message, AdmissionDenial::OperatorUnavailable.message());
}

#[tokio::test]
async fn test_validation_never_creates_sessions() {
    let app = TestApp::with_max_sessions(2);
    let client = app.register("v@example.com", "client").await;
    let id = client.account.id.to_string();
    let admission = &app.services.admission;

    admission
        .create_session(&id, session(SessionType::Consultation, "room"))
        .await
        .unwrap();
    for _ in 0..5 {
        assert!(admission.validate_user_session(&id, "room", None).await.unwrap());
    }
    let active = app.services.sessions.active_sessions(&id).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(app.services.accounts.get(&id).await.unwrap().total_sessions, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_admissions_respect_capacity() {
    let app = Arc::new(TestApp::with_max_sessions(2));
    let op = app.open_operator("busy@example.com").await;
    let id = op.account.id.to_string();

    let mut handles = Vec::new();
    for i in 0..10 {
        let app = app.clone();
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            app.services
                .admission
                .create_session(&id, session(SessionType::Consultation, &format!("room-{i}")))
                .await
        }));
    }

    let mut admitted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(e) => assert_eq!(e.kind, ErrorKind::Precondition),
        }
    }
    assert_eq!(admitted, 2);
    let active = app.services.sessions.active_sessions(&id).await.unwrap();
    assert_eq!(active.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_block_racing_admissions_is_never_reverted() {
    let app = Arc::new(TestApp::with_max_sessions(10));
    let admin = app.admin().await;
    let op = app.open_operator("racing@example.com").await;
    let id = op.account.id.to_string();

    let mut handles = Vec::new();
    for i in 0..6 {
        let app = app.clone();
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            app.services
                .admission
                .create_session(&id, session(SessionType::Consultation, &format!("room-{i}")))
                .await
        }));
    }
    app.services
        .operators
        .verify_operator(&admin, &id, "blocked")
        .await
        .unwrap();

    let mut admitted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => admitted += 1,
            Err(e) => assert_eq!(e.message, AdmissionDenial::OperatorUnavailable.message()),
        }
    }

    let account = app.services.accounts.get(&id).await.unwrap();
    assert_eq!(account.operator_status, Some(OperatorStatus::Blocked));
    assert_eq!(account.total_sessions, admitted);
    let active = app.services.sessions.active_sessions(&id).await.unwrap();
    assert_eq!(active.len() as i64, admitted);

    let err = app
        .services
        .admission
        .create_session(&id, session(SessionType::Consultation, "late"))
        .await
        .unwrap_err();
    assert_eq!(err.message, AdmissionDenial::OperatorUnavailable.message());
}
