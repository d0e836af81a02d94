//! Repository for join requests and their student batches.

use cpms_core::types::DbId;
use sqlx::{PgConnection, PgExecutor, PgPool};

use crate::models::join_request::JoinRequest;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, proposal_id, status, created_at, updated_at";

/// Provides operations for the join-request workflow.
pub struct JoinRequestRepo;

impl JoinRequestRepo {
    /// Insert a pending request and its student batch in one transaction
    /// scope (the caller owns the transaction).
    pub async fn create(
        conn: &mut PgConnection,
        proposal_id: DbId,
        student_ids: &[DbId],
    ) -> Result<JoinRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO join_requests (proposal_id) VALUES ($1) RETURNING {COLUMNS}"
        );
        let request = sqlx::query_as::<_, JoinRequest>(&query)
            .bind(proposal_id)
            .fetch_one(&mut *conn)
            .await?;

        sqlx::query(
            "INSERT INTO join_request_students (request_id, student_id)
             SELECT $1, unnest($2::BIGINT[])",
        )
        .bind(request.id)
        .bind(student_ids)
        .execute(&mut *conn)
        .await?;

        Ok(request)
    }

    /// Find a request by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<JoinRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM join_requests WHERE id = $1");
        sqlx::query_as::<_, JoinRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The student batch behind a request.
    pub async fn student_ids<'e>(
        executor: impl PgExecutor<'e>,
        request_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT student_id FROM join_request_students WHERE request_id = $1 ORDER BY id ASC",
        )
        .bind(request_id)
        .fetch_all(executor)
        .await
    }

    /// Duplicate guard: find a pending request on the same proposal whose
    /// student set contains every id in `student_ids`.
    pub async fn find_pending_covering(
        pool: &PgPool,
        proposal_id: DbId,
        student_ids: &[DbId],
    ) -> Result<Option<JoinRequest>, sqlx::Error> {
        sqlx::query_as::<_, JoinRequest>(
            "SELECT r.id, r.proposal_id, r.status, r.created_at, r.updated_at
             FROM join_requests r
             WHERE r.proposal_id = $1
               AND r.status = 'pending'
               AND NOT EXISTS (
                   SELECT 1 FROM unnest($2::BIGINT[]) AS incoming(student_id)
                   WHERE incoming.student_id NOT IN (
                       SELECT s.student_id FROM join_request_students s
                       WHERE s.request_id = r.id
                   )
               )
             LIMIT 1",
        )
        .bind(proposal_id)
        .bind(student_ids)
        .fetch_optional(pool)
        .await
    }

    /// All pending requests against one supervisor's proposals, newest first.
    pub async fn list_pending_for_supervisor(
        pool: &PgPool,
        supervisor_id: DbId,
    ) -> Result<Vec<JoinRequest>, sqlx::Error> {
        sqlx::query_as::<_, JoinRequest>(
            "SELECT r.id, r.proposal_id, r.status, r.created_at, r.updated_at
             FROM join_requests r
             JOIN proposals p ON p.id = r.proposal_id
             WHERE p.supervisor_id = $1 AND r.status = 'pending'
             ORDER BY r.created_at DESC",
        )
        .bind(supervisor_id)
        .fetch_all(pool)
        .await
    }

    /// Flip a pending request to a terminal status. The `status = 'pending'`
    /// guard makes terminal states sticky. Returns `true` if a row changed.
    pub async fn set_status<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        status: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE join_requests SET status = $2 WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .bind(status)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
