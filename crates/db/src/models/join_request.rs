//! Join request entity model and DTOs.

use cpms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A join request row from the `join_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct JoinRequest {
    pub id: DbId,
    pub proposal_id: DbId,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a join request: the batch of students requesting
/// admission together.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJoinRequest {
    pub student_ids: Vec<DbId>,
}
