//! Proposal lifecycle state machine.
//!
//! A proposal moves `draft -> submitted -> approved | rejected`, and a
//! rejected proposal returns to `draft` when its supervisor edits it.
//! The guards here are pure: handlers load the row, run the guard, and
//! persist the transition result.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Minimum value allowed for `max_students`.
pub const MIN_STUDENTS: i32 = 1;

/// Maximum value allowed for `max_students`.
pub const MAX_STUDENTS: i32 = 5;

/// Lifecycle states of a proposal. Stored lowercase in the `status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl ProposalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProposalStatus::Draft => "draft",
            ProposalStatus::Submitted => "submitted",
            ProposalStatus::Approved => "approved",
            ProposalStatus::Rejected => "rejected",
        }
    }

    /// Whether the supervisor may still edit the proposal fields.
    pub fn is_editable(self) -> bool {
        matches!(self, ProposalStatus::Draft | ProposalStatus::Rejected)
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProposalStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ProposalStatus::Draft),
            "submitted" => Ok(ProposalStatus::Submitted),
            "approved" => Ok(ProposalStatus::Approved),
            "rejected" => Ok(ProposalStatus::Rejected),
            other => Err(CoreError::Internal(format!(
                "Unknown proposal status '{other}'"
            ))),
        }
    }
}

/// Validate the required fields of a new proposal.
///
/// Title, tech stack, and summary must be non-empty and `max_students`
/// must lie in `1..=5`.
pub fn validate_new(
    title: &str,
    tech_stack: &[String],
    summary: &str,
    max_students: i32,
) -> Result<(), CoreError> {
    let mut missing = Vec::new();
    if title.trim().is_empty() {
        missing.push("title");
    }
    if tech_stack.is_empty() || tech_stack.iter().all(|t| t.trim().is_empty()) {
        missing.push("techStack");
    }
    if summary.trim().is_empty() {
        missing.push("summary");
    }
    if !missing.is_empty() {
        return Err(CoreError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }
    if !(MIN_STUDENTS..=MAX_STUDENTS).contains(&max_students) {
        return Err(CoreError::Validation(format!(
            "maxStudents must be between {MIN_STUDENTS} and {MAX_STUDENTS}"
        )));
    }
    Ok(())
}

/// Validate the fields of a partial update. Provided fields must not be
/// blanked out, and `max_students` must stay within bounds.
pub fn validate_update(
    title: Option<&str>,
    tech_stack: Option<&[String]>,
    summary: Option<&str>,
    max_students: Option<i32>,
) -> Result<(), CoreError> {
    if let Some(t) = title {
        if t.trim().is_empty() {
            return Err(CoreError::Validation("title must not be empty".into()));
        }
    }
    if let Some(stack) = tech_stack {
        if stack.is_empty() || stack.iter().all(|t| t.trim().is_empty()) {
            return Err(CoreError::Validation("techStack must not be empty".into()));
        }
    }
    if let Some(s) = summary {
        if s.trim().is_empty() {
            return Err(CoreError::Validation("summary must not be empty".into()));
        }
    }
    if let Some(max) = max_students {
        if !(MIN_STUDENTS..=MAX_STUDENTS).contains(&max) {
            return Err(CoreError::Validation(format!(
                "maxStudents must be between {MIN_STUDENTS} and {MAX_STUDENTS}"
            )));
        }
    }
    Ok(())
}

/// Ensure the acting user owns the proposal.
pub fn ensure_owner(supervisor_id: DbId, actor_id: DbId) -> Result<(), CoreError> {
    if supervisor_id == actor_id {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Not authorized to modify this proposal".into(),
        ))
    }
}

/// Outcome of editing a proposal: the status it ends up in and whether
/// stored feedback must be cleared as part of the same write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditOutcome {
    pub next_status: ProposalStatus,
    pub clear_feedback: bool,
}

/// Guard for editing proposal fields.
///
/// Editing is legal in `draft` and `rejected`. Editing a rejected
/// proposal moves it back to `draft` and clears the coordinator's
/// feedback in the same operation.
pub fn edit(status: ProposalStatus) -> Result<EditOutcome, CoreError> {
    match status {
        ProposalStatus::Draft => Ok(EditOutcome {
            next_status: ProposalStatus::Draft,
            clear_feedback: false,
        }),
        ProposalStatus::Rejected => Ok(EditOutcome {
            next_status: ProposalStatus::Draft,
            clear_feedback: true,
        }),
        other => Err(CoreError::InvalidState(format!(
            "Can only update proposals in draft or rejected status (currently {other})"
        ))),
    }
}

/// Transition `draft -> submitted`.
pub fn submit(status: ProposalStatus) -> Result<ProposalStatus, CoreError> {
    match status {
        ProposalStatus::Draft => Ok(ProposalStatus::Submitted),
        other => Err(CoreError::InvalidState(format!(
            "Can only submit proposals in draft status (currently {other})"
        ))),
    }
}

/// Transition `submitted -> approved`. Feedback is optional.
pub fn approve(status: ProposalStatus) -> Result<ProposalStatus, CoreError> {
    match status {
        ProposalStatus::Submitted => Ok(ProposalStatus::Approved),
        other => Err(CoreError::InvalidState(format!(
            "Can only approve submitted proposals (currently {other})"
        ))),
    }
}

/// Transition `submitted -> rejected`. Feedback is mandatory and is
/// stored verbatim.
pub fn reject(status: ProposalStatus, feedback: Option<&str>) -> Result<ProposalStatus, CoreError> {
    if status != ProposalStatus::Submitted {
        return Err(CoreError::InvalidState(format!(
            "Can only reject submitted proposals (currently {status})"
        )));
    }
    match feedback {
        Some(f) if !f.trim().is_empty() => Ok(ProposalStatus::Rejected),
        _ => Err(CoreError::Validation(
            "Feedback is required when rejecting a proposal".into(),
        )),
    }
}

/// Guard for deleting a proposal. Only drafts may be deleted.
pub fn ensure_deletable(status: ProposalStatus) -> Result<(), CoreError> {
    match status {
        ProposalStatus::Draft => Ok(()),
        other => Err(CoreError::InvalidState(format!(
            "Can only delete proposals in draft status (currently {other})"
        ))),
    }
}
