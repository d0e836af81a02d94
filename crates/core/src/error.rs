use crate::types::DbId;

/// Domain error taxonomy shared by all crates.
///
/// The API layer maps each variant onto an HTTP status: `Validation`,
/// `InvalidState`, `Duplicate`, and `CapacityExceeded` surface as 400,
/// `Unauthorized` as 401, `Forbidden` as 403, `NotFound` as 404, and
/// `Internal` as 500.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience alias for domain-level results.
pub type CoreResult<T> = Result<T, CoreError>;
