use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use tierscope_application::{AuditEvent, AuditLogQuery, AuditLogRepository, AuditRepository};
use tierscope_domain::{AuditAction, UserId};

use super::PostgresAuditRepository;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(2)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres audit tests: {error}");
    }

    Some(pool)
}

#[tokio::test]
async fn appended_events_are_listed_by_subject_and_action() {
    let Some(pool) = test_pool().await else {
        return;
    };

    let repository = PostgresAuditRepository::new(pool);
    let subject = UserId::new().to_string();
    for action in [AuditAction::UserRoleUpdated, AuditAction::BalanceAdjusted] {
        let appended = repository
            .append_event(AuditEvent {
                subject: subject.clone(),
                action,
                resource_type: "user".to_owned(),
                resource_id: subject.clone(),
                detail: None,
            })
            .await;
        assert!(appended.is_ok());
    }

    let listed = repository
        .list_recent_entries(AuditLogQuery {
            limit: 50,
            offset: 0,
            action: Some(AuditAction::BalanceAdjusted.as_str().to_owned()),
            subject: Some(subject.clone()),
        })
        .await
        .unwrap_or_default();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].action, "balance.adjusted");
    assert!(listed[0].created_at.ends_with('Z'));
}
