//! Invitation lifecycle guards and recipient resolution.
//!
//! A group member invites another student to join the group. Acceptance
//! adds the recipient to the member set. Capacity is NOT re-checked on
//! acceptance -- the source system lets invitations bypass the capacity
//! policy, and the asymmetry is reproduced here pending product-owner
//! confirmation (see DESIGN.md).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Lifecycle states of an invitation. Stored lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl InvitationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvitationStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvitationStatus::Pending),
            "accepted" => Ok(InvitationStatus::Accepted),
            "rejected" => Ok(InvitationStatus::Rejected),
            other => Err(CoreError::Internal(format!(
                "Unknown invitation status '{other}'"
            ))),
        }
    }
}

/// Recipient reference in an invitation payload: either an internal user
/// id or an email address, resolved by a single lookup with explicit
/// branching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientRef {
    ById(DbId),
    ByEmail(String),
}

impl RecipientRef {
    /// Parse a raw payload token. An all-digit token is treated as an
    /// internal id, anything else as an email address.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CoreError::Validation("Recipient is required".into()));
        }
        if trimmed.chars().all(|c| c.is_ascii_digit()) {
            let id = trimmed
                .parse::<DbId>()
                .map_err(|_| CoreError::Validation(format!("Invalid recipient id '{trimmed}'")))?;
            Ok(RecipientRef::ById(id))
        } else {
            Ok(RecipientRef::ByEmail(trimmed.to_string()))
        }
    }
}

/// Accepting or rejecting is only legal while the invitation is pending.
pub fn ensure_pending(status: InvitationStatus) -> Result<(), CoreError> {
    match status {
        InvitationStatus::Pending => Ok(()),
        other => Err(CoreError::InvalidState(format!(
            "Invitation already processed (status {other})"
        ))),
    }
}

/// Only the invited student may act on an invitation.
pub fn ensure_recipient(to_user_id: DbId, actor_id: DbId) -> Result<(), CoreError> {
    if to_user_id == actor_id {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Not authorized to respond to this invitation".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for s in [
            InvitationStatus::Pending,
            InvitationStatus::Accepted,
            InvitationStatus::Rejected,
        ] {
            assert_eq!(s.as_str().parse::<InvitationStatus>().unwrap(), s);
        }
    }

    #[test]
    fn test_numeric_token_parses_as_id() {
        assert_eq!(RecipientRef::parse("42").unwrap(), RecipientRef::ById(42));
    }

    #[test]
    fn test_email_token_parses_as_email() {
        assert_eq!(
            RecipientRef::parse("ada@uni.edu").unwrap(),
            RecipientRef::ByEmail("ada@uni.edu".to_string())
        );
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        assert_eq!(
            RecipientRef::parse("  7 ").unwrap(),
            RecipientRef::ById(7)
        );
    }

    #[test]
    fn test_empty_recipient_fails() {
        assert!(matches!(
            RecipientRef::parse("   "),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_only_recipient_may_respond() {
        assert!(ensure_recipient(5, 5).is_ok());
        assert!(matches!(
            ensure_recipient(5, 6),
            Err(CoreError::Forbidden(_))
        ));
    }

    #[test]
    fn test_terminal_invitation_cannot_be_processed_again() {
        assert!(ensure_pending(InvitationStatus::Pending).is_ok());
        assert!(ensure_pending(InvitationStatus::Accepted).is_err());
        assert!(ensure_pending(InvitationStatus::Rejected).is_err());
    }
}
