//! Repository for the `proposals` table.

use cpms_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::proposal::{CreateProposal, Proposal, ProposalWithCount, UpdateProposal};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, tech_stack, summary, supervisor_id, status, feedback, \
                        max_students, semester, created_at, updated_at";

/// SELECT prefix joining each proposal with its confirmed-member count.
///
/// The count comes from `group_members` via the proposal's 1:1 group, so
/// it is 0 until the proposal is approved and students start joining.
const COUNTED_SELECT: &str = "SELECT p.id, p.title, p.tech_stack, p.summary, p.supervisor_id, \
     p.status, p.feedback, p.max_students, \
     COALESCE(m.member_count, 0) AS current_students, \
     p.semester, p.created_at, p.updated_at \
     FROM proposals p \
     LEFT JOIN project_groups g ON g.proposal_id = p.id \
     LEFT JOIN (SELECT group_id, COUNT(*) AS member_count \
                FROM group_members GROUP BY group_id) m ON m.group_id = g.id";

/// Provides CRUD operations for proposals.
pub struct ProposalRepo;

impl ProposalRepo {
    /// Insert a new proposal in `draft` status, returning the created row.
    pub async fn create(
        pool: &PgPool,
        supervisor_id: DbId,
        input: &CreateProposal,
    ) -> Result<Proposal, sqlx::Error> {
        let query = format!(
            "INSERT INTO proposals (title, tech_stack, summary, supervisor_id, max_students, semester)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Proposal>(&query)
            .bind(&input.title)
            .bind(&input.tech_stack)
            .bind(&input.summary)
            .bind(supervisor_id)
            .bind(input.max_students)
            .bind(&input.semester)
            .fetch_one(pool)
            .await
    }

    /// Find a proposal by its internal ID.
    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Proposal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM proposals WHERE id = $1");
        sqlx::query_as::<_, Proposal>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a proposal by ID with a row lock, for use inside a transaction
    /// that is about to mutate membership. Serializes concurrent capacity
    /// decisions against the same proposal.
    pub async fn find_by_id_for_update<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Proposal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM proposals WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Proposal>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Find a proposal by ID joined with its confirmed-member count.
    pub async fn find_with_count(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProposalWithCount>, sqlx::Error> {
        let query = format!("{COUNTED_SELECT} WHERE p.id = $1");
        sqlx::query_as::<_, ProposalWithCount>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all proposals with counts, newest first.
    pub async fn list_with_counts(pool: &PgPool) -> Result<Vec<ProposalWithCount>, sqlx::Error> {
        let query = format!("{COUNTED_SELECT} ORDER BY p.created_at DESC");
        sqlx::query_as::<_, ProposalWithCount>(&query)
            .fetch_all(pool)
            .await
    }

    /// List one supervisor's proposals with counts, newest first.
    pub async fn list_by_supervisor(
        pool: &PgPool,
        supervisor_id: DbId,
    ) -> Result<Vec<ProposalWithCount>, sqlx::Error> {
        let query = format!("{COUNTED_SELECT} WHERE p.supervisor_id = $1 ORDER BY p.created_at DESC");
        sqlx::query_as::<_, ProposalWithCount>(&query)
            .bind(supervisor_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a field update. Only non-`None` fields in `input` are applied.
    ///
    /// `next_status` and `clear_feedback` come from the domain edit guard:
    /// editing a rejected proposal resets it to draft and clears feedback
    /// in the same statement, so the two writes cannot diverge.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProposal,
        next_status: &str,
        clear_feedback: bool,
    ) -> Result<Option<Proposal>, sqlx::Error> {
        let query = format!(
            "UPDATE proposals SET
                title = COALESCE($2, title),
                tech_stack = COALESCE($3, tech_stack),
                summary = COALESCE($4, summary),
                max_students = COALESCE($5, max_students),
                semester = COALESCE($6, semester),
                status = $7,
                feedback = CASE WHEN $8 THEN NULL ELSE feedback END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Proposal>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.tech_stack)
            .bind(&input.summary)
            .bind(input.max_students)
            .bind(&input.semester)
            .bind(next_status)
            .bind(clear_feedback)
            .fetch_optional(pool)
            .await
    }

    /// Transition the proposal's status, optionally recording feedback.
    ///
    /// `feedback = None` leaves any stored feedback untouched.
    pub async fn set_status<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        status: &str,
        feedback: Option<&str>,
    ) -> Result<Option<Proposal>, sqlx::Error> {
        let query = format!(
            "UPDATE proposals SET status = $2, feedback = COALESCE($3, feedback)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Proposal>(&query)
            .bind(id)
            .bind(status)
            .bind(feedback)
            .fetch_optional(executor)
            .await
    }

    /// Permanently delete a proposal. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM proposals WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
