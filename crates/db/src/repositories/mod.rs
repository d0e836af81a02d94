//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods.
//! Methods that participate in multi-entity transactions accept an
//! executor (pool, connection, or open transaction); the rest take
//! `&PgPool` directly.

pub mod group_repo;
pub mod invitation_repo;
pub mod join_request_repo;
pub mod notification_repo;
pub mod proposal_repo;
pub mod role_repo;
pub mod session_repo;
pub mod user_repo;

pub use group_repo::GroupRepo;
pub use invitation_repo::InvitationRepo;
pub use join_request_repo::JoinRequestRepo;
pub use notification_repo::NotificationRepo;
pub use proposal_repo::ProposalRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
