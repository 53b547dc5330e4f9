use sqlx::PgPool;
use tierscope_core::{AppResult, UserIdentity};
use tierscope_domain::{AdminRole, Principal, UserId};
use tierscope_infrastructure::PostgresDirectoryRepository;
use tracing::info;

use crate::api_config::ApiConfig;
use crate::api_services::{RepositorySet, build_app_state};
use crate::state::AppState;

const DEV_SEED_ADMIN_USER_ID: &str = "5e1c9d2a-6b0f-4a7e-9d3c-1f8b4a6c2e70";
const DEV_SEED_SUPERIOR_USER_ID: &str = "3f0d6a52-8f5e-4c1b-9b7e-2d4c6e8a1f03";
const DEV_SEED_MANAGER_USER_ID: &str = "7b4e2c91-1d3a-4f6b-8c5e-9a0b2d4f6e81";
const DEV_SEED_MEMBER_USER_ID: &str = "c4a7f0b3-2e9d-4b51-a6f8-0d3e7c9b5a12";

struct SeedUser {
    id: &'static str,
    display_name: &'static str,
    email: &'static str,
    role: AdminRole,
}

const SEED_USERS: [SeedUser; 4] = [
    SeedUser {
        id: DEV_SEED_ADMIN_USER_ID,
        display_name: "Directory Admin",
        email: "admin@tierscope.local",
        role: AdminRole::FullAdmin,
    },
    SeedUser {
        id: DEV_SEED_SUPERIOR_USER_ID,
        display_name: "Regional Lead",
        email: "lead@tierscope.local",
        role: AdminRole::SuperiorManager,
    },
    SeedUser {
        id: DEV_SEED_MANAGER_USER_ID,
        display_name: "Team Manager",
        email: "manager@tierscope.local",
        role: AdminRole::Manager,
    },
    SeedUser {
        id: DEV_SEED_MEMBER_USER_ID,
        display_name: "Team Member",
        email: "member@tierscope.local",
        role: AdminRole::None,
    },
];

/// Manager/assignee pairs created by the seed.
const SEED_ASSIGNMENTS: [(&str, &str); 2] = [
    (DEV_SEED_SUPERIOR_USER_ID, DEV_SEED_MANAGER_USER_ID),
    (DEV_SEED_MANAGER_USER_ID, DEV_SEED_MEMBER_USER_ID),
];

/// Registers the demo directory and its hierarchy. Safe to run repeatedly.
pub async fn run(pool: PgPool, config: &ApiConfig) -> AppResult<()> {
    let directory = PostgresDirectoryRepository::new(pool.clone());
    for principal in seed_principals()? {
        directory
            .upsert_user(
                principal.id(),
                principal.display_name(),
                principal.email(),
                principal.flags(),
            )
            .await?;
    }

    let repositories = RepositorySet::postgres(&pool);
    let app_state = build_app_state(pool, repositories, config);
    let created = ensure_seed_assignments(&app_state).await?;

    info!(
        users = SEED_USERS.len(),
        assignments_created = created,
        admin_user_id = DEV_SEED_ADMIN_USER_ID,
        "dev seed applied"
    );
    Ok(())
}

fn seed_principals() -> AppResult<Vec<Principal>> {
    SEED_USERS
        .iter()
        .map(|user| -> AppResult<Principal> {
            Ok(Principal::new(
                UserId::parse(user.id)?,
                user.display_name,
                Some(user.email.to_owned()),
                user.role.flags(),
            ))
        })
        .collect()
}

fn seed_admin_identity() -> UserIdentity {
    let admin = &SEED_USERS[0];
    UserIdentity::new(admin.id, admin.display_name, Some(admin.email.to_owned()))
}

/// Creates missing seed assignments as the seed administrator.
async fn ensure_seed_assignments(app_state: &AppState) -> AppResult<usize> {
    let actor = seed_admin_identity();
    let existing = app_state.hierarchy_service.list_assignments(&actor).await?;

    let mut created = 0;
    for (manager, assignee) in SEED_ASSIGNMENTS {
        let manager_id = UserId::parse(manager)?;
        let user_id = UserId::parse(assignee)?;
        let present = existing.iter().any(|assignment| {
            assignment.manager_id == manager_id && assignment.assigned_user_id == user_id
        });
        if present {
            continue;
        }

        app_state
            .hierarchy_service
            .assign(&actor, manager_id, user_id)
            .await?;
        created += 1;
    }

    Ok(created)
}
