//! Project group entity models and DTOs.

use cpms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A group row from the `project_groups` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProjectGroup {
    pub id: DbId,
    pub proposal_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A stage due-date row from the `group_due_dates` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GroupDueDate {
    pub id: DbId,
    pub group_id: DbId,
    pub stage: String,
    pub due_date: Option<Timestamp>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for setting a stage due date.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDueDate {
    pub due_date: Option<Timestamp>,
    pub active: Option<bool>,
}
