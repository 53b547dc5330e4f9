use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::debug;

use tierscope_application::{DirectoryRepository, HierarchyRepository, NewAssignment};
use tierscope_core::{AppError, AppResult};
use tierscope_domain::{Principal, RoleFlags, UserAssignment, UserId};

/// PostgreSQL-backed user directory and assignment store.
#[derive(Clone)]
pub struct PostgresDirectoryRepository {
    pool: PgPool,
}

impl PostgresDirectoryRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a user, or refreshes its profile when it already exists.
    ///
    /// Role flags of an existing user are left untouched.
    pub async fn upsert_user(
        &self,
        user_id: UserId,
        display_name: &str,
        email: Option<&str>,
        flags: RoleFlags,
    ) -> AppResult<Principal> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            INSERT INTO users (id, display_name, email, is_admin, is_manager, is_superiormanager)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE
            SET display_name = EXCLUDED.display_name,
                email = EXCLUDED.email,
                updated_at = now()
            RETURNING id, display_name, email, is_admin, is_manager, is_superiormanager
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(display_name)
        .bind(email)
        .bind(flags.is_admin)
        .bind(flags.is_manager)
        .bind(flags.is_superiormanager)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(database_error) = &error
                && database_error.code().as_deref() == Some("23505")
            {
                return AppError::Conflict(format!(
                    "email '{}' is already used by another user",
                    email.unwrap_or_default()
                ));
            }

            AppError::Internal(format!("failed to upsert user: {error}"))
        })?;

        Ok(row.into_principal())
    }
}

#[derive(Debug, FromRow)]
struct PrincipalRow {
    id: uuid::Uuid,
    display_name: String,
    email: Option<String>,
    is_admin: bool,
    is_manager: bool,
    is_superiormanager: bool,
}

impl PrincipalRow {
    fn into_principal(self) -> Principal {
        Principal::new(
            UserId::from_uuid(self.id),
            self.display_name,
            self.email,
            RoleFlags::new(self.is_admin, self.is_manager, self.is_superiormanager),
        )
    }
}

#[derive(Debug, FromRow)]
struct AssignmentRow {
    manager_id: uuid::Uuid,
    assigned_user_id: uuid::Uuid,
    assigned_by: uuid::Uuid,
    created_at: DateTime<Utc>,
}

impl From<AssignmentRow> for UserAssignment {
    fn from(row: AssignmentRow) -> Self {
        Self {
            manager_id: UserId::from_uuid(row.manager_id),
            assigned_user_id: UserId::from_uuid(row.assigned_user_id),
            assigned_by: UserId::from_uuid(row.assigned_by),
            created_at: row.created_at,
        }
    }
}

fn to_uuids(user_ids: &[UserId]) -> Vec<uuid::Uuid> {
    user_ids.iter().map(UserId::as_uuid).collect()
}

#[async_trait]
impl DirectoryRepository for PostgresDirectoryRepository {
    async fn find_principal(&self, user_id: UserId) -> AppResult<Option<Principal>> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT id, display_name, email, is_admin, is_manager, is_superiormanager
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load user: {error}")))?;

        Ok(row.map(PrincipalRow::into_principal))
    }

    async fn list_principals(&self, user_ids: &[UserId]) -> AppResult<Vec<Principal>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT id, display_name, email, is_admin, is_manager, is_superiormanager
            FROM users
            WHERE id = ANY($1)
            ORDER BY id
            "#,
        )
        .bind(to_uuids(user_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list users: {error}")))?;

        Ok(rows.into_iter().map(PrincipalRow::into_principal).collect())
    }

    async fn list_all_principals(&self) -> AppResult<Vec<Principal>> {
        let rows = sqlx::query_as::<_, PrincipalRow>(
            r#"
            SELECT id, display_name, email, is_admin, is_manager, is_superiormanager
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list users: {error}")))?;

        Ok(rows.into_iter().map(PrincipalRow::into_principal).collect())
    }

    async fn list_assigned_user_ids(&self, manager_ids: &[UserId]) -> AppResult<Vec<UserId>> {
        if manager_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_scalar::<_, uuid::Uuid>(
            r#"
            SELECT DISTINCT assigned_user_id
            FROM user_assignments
            WHERE manager_id = ANY($1)
            "#,
        )
        .bind(to_uuids(manager_ids))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list assigned users: {error}"))
        })?;

        Ok(rows.into_iter().map(UserId::from_uuid).collect())
    }
}

#[async_trait]
impl HierarchyRepository for PostgresDirectoryRepository {
    async fn list_assignments(
        &self,
        manager_ids: Option<&[UserId]>,
    ) -> AppResult<Vec<UserAssignment>> {
        let rows = sqlx::query_as::<_, AssignmentRow>(
            r#"
            SELECT manager_id, assigned_user_id, assigned_by, created_at
            FROM user_assignments
            WHERE $1::UUID[] IS NULL OR manager_id = ANY($1)
            ORDER BY created_at, manager_id, assigned_user_id
            "#,
        )
        .bind(manager_ids.map(to_uuids))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list assignments: {error}")))?;

        Ok(rows.into_iter().map(UserAssignment::from).collect())
    }

    async fn create_assignment(&self, assignment: NewAssignment) -> AppResult<UserAssignment> {
        let row = sqlx::query_as::<_, AssignmentRow>(
            r#"
            INSERT INTO user_assignments (manager_id, assigned_user_id, assigned_by)
            VALUES ($1, $2, $3)
            RETURNING manager_id, assigned_user_id, assigned_by, created_at
            "#,
        )
        .bind(assignment.manager_id.as_uuid())
        .bind(assignment.assigned_user_id.as_uuid())
        .bind(assignment.assigned_by.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(database_error) = &error
                && database_error.code().as_deref() == Some("23505")
            {
                return AppError::Conflict(format!(
                    "user '{}' is already assigned to '{}'",
                    assignment.assigned_user_id, assignment.manager_id
                ));
            }

            AppError::Internal(format!("failed to create assignment: {error}"))
        })?;

        Ok(row.into())
    }

    async fn delete_assignment(&self, manager_id: UserId, user_id: UserId) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_assignments
            WHERE manager_id = $1 AND assigned_user_id = $2
            "#,
        )
        .bind(manager_id.as_uuid())
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete assignment: {error}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn replace_role_flags(&self, user_id: UserId, flags: RoleFlags) -> AppResult<u64> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let updated = sqlx::query(
            r#"
            UPDATE users
            SET is_admin = $2,
                is_manager = $3,
                is_superiormanager = $4,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(flags.is_admin)
        .bind(flags.is_manager)
        .bind(flags.is_superiormanager)
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update role flags: {error}")))?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("user '{user_id}' was not found")));
        }

        let dropped = sqlx::query(
            r#"
            DELETE FROM user_assignments
            WHERE manager_id = $1 OR assigned_user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to drop stale assignments: {error}"))
        })?
        .rows_affected();

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        debug!(user_id = %user_id, dropped, "role flags replaced");
        Ok(dropped)
    }
}
