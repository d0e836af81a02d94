//! Capacity policy for proposal membership.
//!
//! A proposal can hold at most `max_students` confirmed members. The
//! confirmed count is derived from the group's member set, so every join
//! path (batch approval and direct join) checks against the same number.

use crate::error::CoreError;

/// Returns whether a proposal with `confirmed` members out of
/// `max_students` can accept `additional` more. Pure, no side effects.
pub fn can_accept(confirmed: i64, max_students: i32, additional: usize) -> bool {
    confirmed + additional as i64 <= i64::from(max_students)
}

/// Capacity check that produces the domain error on overflow.
pub fn ensure_can_accept(
    confirmed: i64,
    max_students: i32,
    additional: usize,
) -> Result<(), CoreError> {
    if can_accept(confirmed, max_students, additional) {
        Ok(())
    } else {
        Err(CoreError::CapacityExceeded(format!(
            "Proposal has {confirmed} of {max_students} students and cannot accept {additional} more"
        )))
    }
}
