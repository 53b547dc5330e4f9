use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use tierscope_application::{AuditLogQuery, AuditLogRepository};
use tierscope_core::{AppError, UserIdentity};
use tierscope_domain::{AdminRole, UserId};
use tower_sessions::{MemoryStore, Session};

use super::{SESSION_USER_KEY, logout_handler, me_handler, session_bootstrap_handler};
use crate::dto::SessionBootstrapRequest;
use crate::error::ApiError;
use crate::test_support::{BOOTSTRAP_TOKEN, TestApp};

fn new_session() -> Session {
    Session::new(None, Arc::new(MemoryStore::default()), None)
}

fn bootstrap_request(user_id: String, token: &str) -> Json<SessionBootstrapRequest> {
    Json(SessionBootstrapRequest {
        user_id,
        token: token.to_owned(),
    })
}

#[tokio::test]
async fn wrong_bootstrap_token_is_rejected() {
    let app = TestApp::new();
    let (manager, _) = app.user("Max", AdminRole::Manager).await;
    let session = new_session();

    let result = session_bootstrap_handler(
        State(app.state.clone()),
        session.clone(),
        bootstrap_request(manager.id().to_string(), "wrong-token"),
    )
    .await;

    assert!(matches!(result, Err(ApiError(AppError::Unauthorized(_)))));
    let stored = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(stored, None);
}

#[tokio::test]
async fn unknown_user_cannot_start_a_session() {
    let app = TestApp::new();

    let result = session_bootstrap_handler(
        State(app.state.clone()),
        new_session(),
        bootstrap_request(UserId::new().to_string(), BOOTSTRAP_TOKEN),
    )
    .await;

    assert!(matches!(result, Err(ApiError(AppError::Unauthorized(_)))));
}

#[tokio::test]
async fn bootstrap_stores_identity_and_audits_session_start() {
    let app = TestApp::new();
    let (manager, identity) = app.user("Max", AdminRole::Manager).await;
    let session = new_session();

    let status = session_bootstrap_handler(
        State(app.state.clone()),
        session.clone(),
        bootstrap_request(manager.id().to_string(), BOOTSTRAP_TOKEN),
    )
    .await
    .unwrap_or_else(|_| unreachable!());
    assert_eq!(status, StatusCode::NO_CONTENT);

    let stored = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(stored, Some(identity));

    let entries = app
        .activity
        .list_recent_entries(AuditLogQuery {
            limit: 10,
            offset: 0,
            action: Some("session.started".to_owned()),
            subject: None,
        })
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].subject, manager.id().to_string());
}

#[tokio::test]
async fn me_reports_role_and_scope_until_logout() {
    let app = TestApp::new();
    let (manager, _) = app.user("Max", AdminRole::Manager).await;
    let session = new_session();
    session_bootstrap_handler(
        State(app.state.clone()),
        session.clone(),
        bootstrap_request(manager.id().to_string(), BOOTSTRAP_TOKEN),
    )
    .await
    .unwrap_or_else(|_| unreachable!());

    let me = me_handler(State(app.state.clone()), session.clone())
        .await
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(me.0.user_id, manager.id().to_string());
    assert_eq!(me.0.role, "manager");
    assert_eq!(me.0.scope.kind, "restricted");
    assert_eq!(me.0.scope.user_ids, vec![manager.id().to_string()]);

    logout_handler(session.clone())
        .await
        .unwrap_or_else(|_| unreachable!());

    let result = me_handler(State(app.state.clone()), session).await;
    assert!(matches!(result, Err(ApiError(AppError::Unauthorized(_)))));
}
