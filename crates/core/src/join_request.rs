//! Join-request lifecycle guards.
//!
//! A batch of students requests admission to a proposal together. The
//! request is `pending` until the owning supervisor approves or rejects
//! it; both outcomes are terminal. Capacity is checked at approval time,
//! not at creation.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Lifecycle states of a join request. Stored lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl JoinRequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JoinRequestStatus::Pending => "pending",
            JoinRequestStatus::Approved => "approved",
            JoinRequestStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for JoinRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JoinRequestStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JoinRequestStatus::Pending),
            "approved" => Ok(JoinRequestStatus::Approved),
            "rejected" => Ok(JoinRequestStatus::Rejected),
            other => Err(CoreError::Internal(format!(
                "Unknown join request status '{other}'"
            ))),
        }
    }
}

/// Validate the student batch of a new join request: non-empty, no
/// repeated ids.
pub fn validate_batch(student_ids: &[DbId]) -> Result<(), CoreError> {
    if student_ids.is_empty() {
        return Err(CoreError::Validation("Student IDs are required".into()));
    }
    let unique: HashSet<DbId> = student_ids.iter().copied().collect();
    if unique.len() != student_ids.len() {
        return Err(CoreError::Validation(
            "Student IDs must not contain duplicates".into(),
        ));
    }
    Ok(())
}

/// Approval and rejection are only legal while the request is pending.
pub fn ensure_pending(status: JoinRequestStatus) -> Result<(), CoreError> {
    match status {
        JoinRequestStatus::Pending => Ok(()),
        other => Err(CoreError::InvalidState(format!(
            "Request already processed (status {other})"
        ))),
    }
}
