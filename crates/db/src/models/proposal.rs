//! Proposal entity model and DTOs.

use cpms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A proposal row from the `proposals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Proposal {
    pub id: DbId,
    pub title: String,
    pub tech_stack: Vec<String>,
    pub summary: String,
    pub supervisor_id: DbId,
    pub status: String,
    pub feedback: Option<String>,
    pub max_students: i32,
    pub semester: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A proposal row joined with its confirmed-member count.
///
/// `current_students` is computed from `group_members` at query time;
/// there is no stored counter to drift out of sync.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProposalWithCount {
    pub id: DbId,
    pub title: String,
    pub tech_stack: Vec<String>,
    pub summary: String,
    pub supervisor_id: DbId,
    pub status: String,
    pub feedback: Option<String>,
    pub max_students: i32,
    pub current_students: i64,
    pub semester: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new proposal.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProposal {
    pub title: String,
    pub tech_stack: Vec<String>,
    pub summary: String,
    pub max_students: i32,
    pub semester: String,
}

/// DTO for updating an existing proposal. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProposal {
    pub title: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub summary: Option<String>,
    pub max_students: Option<i32>,
    pub semester: Option<String>,
}
