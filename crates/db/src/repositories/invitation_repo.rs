//! Repository for the `invitations` table.

use cpms_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::invitation::Invitation;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, group_id, from_user_id, to_user_id, status, created_at, updated_at";

/// Provides operations for the invitation workflow.
pub struct InvitationRepo;

impl InvitationRepo {
    /// Insert a pending invitation, returning the created row.
    pub async fn create(
        pool: &PgPool,
        group_id: DbId,
        from_user_id: DbId,
        to_user_id: DbId,
    ) -> Result<Invitation, sqlx::Error> {
        let query = format!(
            "INSERT INTO invitations (group_id, from_user_id, to_user_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Invitation>(&query)
            .bind(group_id)
            .bind(from_user_id)
            .bind(to_user_id)
            .fetch_one(pool)
            .await
    }

    /// Find an invitation by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Invitation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM invitations WHERE id = $1");
        sqlx::query_as::<_, Invitation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a pending invitation already exists for the triple.
    pub async fn pending_exists(
        pool: &PgPool,
        group_id: DbId,
        from_user_id: DbId,
        to_user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                 SELECT 1 FROM invitations
                 WHERE group_id = $1 AND from_user_id = $2 AND to_user_id = $3
                   AND status = 'pending'
             )",
        )
        .bind(group_id)
        .bind(from_user_id)
        .bind(to_user_id)
        .fetch_one(pool)
        .await
    }

    /// All invitations addressed to a user, newest first.
    pub async fn list_for_recipient(
        pool: &PgPool,
        to_user_id: DbId,
    ) -> Result<Vec<Invitation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM invitations WHERE to_user_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Invitation>(&query)
            .bind(to_user_id)
            .fetch_all(pool)
            .await
    }

    /// Flip a pending invitation to a terminal status. Returns `true` if a
    /// row changed.
    pub async fn set_status<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        status: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE invitations SET status = $2 WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .bind(status)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
