//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does
//! not meet the requirement. Use these in route handlers to enforce
//! authorization at the type level. Ownership checks (proposal owner,
//! invitation recipient) stay in the handlers -- roles alone cannot
//! decide them.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use cpms_core::error::CoreError;
use cpms_core::roles::{ROLE_COORDINATOR, ROLE_STUDENT, ROLE_SUPERVISOR};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `coordinator` role. Rejects with 403 Forbidden otherwise.
pub struct RequireCoordinator(pub AuthUser);

impl FromRequestParts<AppState> for RequireCoordinator {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_COORDINATOR {
            return Err(AppError::Core(CoreError::Forbidden(
                "Coordinator role required".into(),
            )));
        }
        Ok(RequireCoordinator(user))
    }
}

/// Requires the `supervisor` role. Rejects with 403 Forbidden otherwise.
pub struct RequireSupervisor(pub AuthUser);

impl FromRequestParts<AppState> for RequireSupervisor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_SUPERVISOR {
            return Err(AppError::Core(CoreError::Forbidden(
                "Supervisor role required".into(),
            )));
        }
        Ok(RequireSupervisor(user))
    }
}

/// Requires the `student` role. Rejects with 403 Forbidden otherwise.
pub struct RequireStudent(pub AuthUser);

impl FromRequestParts<AppState> for RequireStudent {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_STUDENT {
            return Err(AppError::Core(CoreError::Forbidden(
                "Student role required".into(),
            )));
        }
        Ok(RequireStudent(user))
    }
}

/// Requires `coordinator` or `supervisor` role. Rejects with 403 otherwise.
pub struct RequireStaff(pub AuthUser);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_COORDINATOR && user.role != ROLE_SUPERVISOR {
            return Err(AppError::Core(CoreError::Forbidden(
                "Coordinator or Supervisor role required".into(),
            )));
        }
        Ok(RequireStaff(user))
    }
}

/// Requires any authenticated user (any valid role).
///
/// Functionally equivalent to [`AuthUser`] but named explicitly for use in
/// route definitions where the intent "this route requires authentication"
/// should be self-documenting.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(RequireAuth(user))
    }
}
