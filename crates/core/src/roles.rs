//! Well-known role name constants.
//!
//! These must match the seed data in `20260301000001_create_roles_table.sql`.

pub const ROLE_COORDINATOR: &str = "coordinator";
pub const ROLE_SUPERVISOR: &str = "supervisor";
pub const ROLE_STUDENT: &str = "student";
pub const ROLE_EXAMINER: &str = "examiner";
