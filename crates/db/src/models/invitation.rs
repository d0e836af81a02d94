//! Invitation entity model.

use cpms_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// An invitation row from the `invitations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Invitation {
    pub id: DbId,
    pub group_id: DbId,
    pub from_user_id: DbId,
    pub to_user_id: DbId,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
