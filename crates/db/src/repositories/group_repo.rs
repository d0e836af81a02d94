//! Repository for project groups, their member sets, and stage due dates.

use cpms_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgExecutor, PgPool};

use crate::models::group::{GroupDueDate, ProjectGroup};
use crate::models::user::UserInfo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, proposal_id, created_at, updated_at";

/// Column list for `group_due_dates` queries.
const DUE_DATE_COLUMNS: &str = "id, group_id, stage, due_date, is_active, created_at, updated_at";

/// Provides operations for groups, membership, and due dates.
pub struct GroupRepo;

impl GroupRepo {
    /// Insert a new empty group for a proposal, returning the created row.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        proposal_id: DbId,
    ) -> Result<ProjectGroup, sqlx::Error> {
        let query = format!(
            "INSERT INTO project_groups (proposal_id) VALUES ($1) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProjectGroup>(&query)
            .bind(proposal_id)
            .fetch_one(executor)
            .await
    }

    /// Find a group by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ProjectGroup>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM project_groups WHERE id = $1");
        sqlx::query_as::<_, ProjectGroup>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the group bound to a proposal (1:1).
    pub async fn find_by_proposal<'e>(
        executor: impl PgExecutor<'e>,
        proposal_id: DbId,
    ) -> Result<Option<ProjectGroup>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM project_groups WHERE proposal_id = $1");
        sqlx::query_as::<_, ProjectGroup>(&query)
            .bind(proposal_id)
            .fetch_optional(executor)
            .await
    }

    /// Idempotent create-if-absent of the group for a proposal.
    ///
    /// Checked by existence query; the unique constraint on `proposal_id`
    /// backstops racing callers.
    pub async fn ensure_for_proposal(
        conn: &mut PgConnection,
        proposal_id: DbId,
    ) -> Result<ProjectGroup, sqlx::Error> {
        if let Some(existing) = Self::find_by_proposal(&mut *conn, proposal_id).await? {
            return Ok(existing);
        }
        Self::create(&mut *conn, proposal_id).await
    }

    /// Count confirmed members of a group.
    pub async fn member_count<'e>(
        executor: impl PgExecutor<'e>,
        group_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM group_members WHERE group_id = $1")
            .bind(group_id)
            .fetch_one(executor)
            .await
    }

    /// Whether a student is already a member of the group.
    pub async fn is_member<'e>(
        executor: impl PgExecutor<'e>,
        group_id: DbId,
        student_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM group_members WHERE group_id = $1 AND student_id = $2)",
        )
        .bind(group_id)
        .bind(student_id)
        .fetch_one(executor)
        .await
    }

    /// Add a student to the member set. Idempotent: re-adding an existing
    /// member is a no-op. Returns `true` if a row was inserted.
    pub async fn add_member<'e>(
        executor: impl PgExecutor<'e>,
        group_id: DbId,
        student_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO group_members (group_id, student_id)
             VALUES ($1, $2)
             ON CONFLICT (group_id, student_id) DO NOTHING",
        )
        .bind(group_id)
        .bind(student_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Add a batch of students to the member set in one statement.
    pub async fn add_members<'e>(
        executor: impl PgExecutor<'e>,
        group_id: DbId,
        student_ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO group_members (group_id, student_id)
             SELECT $1, unnest($2::BIGINT[])
             ON CONFLICT (group_id, student_id) DO NOTHING",
        )
        .bind(group_id)
        .bind(student_ids)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    /// Public info for every member of a group, in join order.
    pub async fn members(pool: &PgPool, group_id: DbId) -> Result<Vec<UserInfo>, sqlx::Error> {
        sqlx::query_as::<_, UserInfo>(
            "SELECT u.id, u.email, u.first_name, u.last_name
             FROM group_members gm
             JOIN users u ON u.id = gm.student_id
             WHERE gm.group_id = $1
             ORDER BY gm.joined_at ASC",
        )
        .bind(group_id)
        .fetch_all(pool)
        .await
    }

    /// List groups whose proposal is approved and still has room.
    pub async fn list_available(pool: &PgPool) -> Result<Vec<ProjectGroup>, sqlx::Error> {
        sqlx::query_as::<_, ProjectGroup>(
            "SELECT g.id, g.proposal_id, g.created_at, g.updated_at
             FROM project_groups g
             JOIN proposals p ON p.id = g.proposal_id
             WHERE p.status = 'approved'
               AND (SELECT COUNT(*) FROM group_members gm WHERE gm.group_id = g.id) < p.max_students
             ORDER BY g.created_at DESC",
        )
        .fetch_all(pool)
        .await
    }

    /// List groups whose proposal belongs to the given supervisor.
    pub async fn list_by_supervisor(
        pool: &PgPool,
        supervisor_id: DbId,
    ) -> Result<Vec<ProjectGroup>, sqlx::Error> {
        sqlx::query_as::<_, ProjectGroup>(
            "SELECT g.id, g.proposal_id, g.created_at, g.updated_at
             FROM project_groups g
             JOIN proposals p ON p.id = g.proposal_id
             WHERE p.supervisor_id = $1
             ORDER BY g.created_at DESC",
        )
        .bind(supervisor_id)
        .fetch_all(pool)
        .await
    }

    /// List groups the given student belongs to.
    pub async fn list_by_student(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Vec<ProjectGroup>, sqlx::Error> {
        sqlx::query_as::<_, ProjectGroup>(
            "SELECT g.id, g.proposal_id, g.created_at, g.updated_at
             FROM project_groups g
             JOIN group_members gm ON gm.group_id = g.id
             WHERE gm.student_id = $1
             ORDER BY g.created_at DESC",
        )
        .bind(student_id)
        .fetch_all(pool)
        .await
    }

    /// Read the due date for one stage of a group, if one was ever set.
    pub async fn get_due_date(
        pool: &PgPool,
        group_id: DbId,
        stage: &str,
    ) -> Result<Option<GroupDueDate>, sqlx::Error> {
        let query = format!(
            "SELECT {DUE_DATE_COLUMNS} FROM group_due_dates WHERE group_id = $1 AND stage = $2"
        );
        sqlx::query_as::<_, GroupDueDate>(&query)
            .bind(group_id)
            .bind(stage)
            .fetch_optional(pool)
            .await
    }

    /// Set (or replace) the due date for one stage of a group.
    pub async fn upsert_due_date(
        pool: &PgPool,
        group_id: DbId,
        stage: &str,
        due_date: Option<Timestamp>,
        is_active: bool,
    ) -> Result<GroupDueDate, sqlx::Error> {
        let query = format!(
            "INSERT INTO group_due_dates (group_id, stage, due_date, is_active)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (group_id, stage)
             DO UPDATE SET due_date = EXCLUDED.due_date, is_active = EXCLUDED.is_active
             RETURNING {DUE_DATE_COLUMNS}"
        );
        sqlx::query_as::<_, GroupDueDate>(&query)
            .bind(group_id)
            .bind(stage)
            .bind(due_date)
            .bind(is_active)
            .fetch_one(pool)
            .await
    }
}
