//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for the writes the API accepts

pub mod group;
pub mod invitation;
pub mod join_request;
pub mod notification;
pub mod proposal;
pub mod role;
pub mod session;
pub mod user;
