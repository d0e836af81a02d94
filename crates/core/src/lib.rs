//! CPMS domain core.
//!
//! Pure domain logic for the capstone-project management backend: the
//! proposal state machine, the capacity policy, join-request and
//! invitation guards, and the shared error taxonomy. No storage or HTTP
//! dependencies -- everything here is testable standalone and is driven
//! by the `cpms-db` and `cpms-api` crates.

pub mod capacity;
pub mod error;
pub mod invitation;
pub mod join_request;
pub mod proposal;
pub mod roles;
pub mod stages;
pub mod types;
