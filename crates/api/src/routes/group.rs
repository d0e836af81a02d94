//! Route definitions for the `/groups` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{group, invitation};
use crate::state::AppState;

/// Routes mounted at `/groups`.
///
/// ```text
/// GET  /available                        -> list_available
/// GET  /supervisor                       -> list_supervisor
/// GET  /student                          -> list_student
/// POST /invite                           -> invitation::send
/// GET  /invitations                      -> invitation::list_mine
/// POST /invitations/{id}/accept          -> invitation::accept
/// POST /invitations/{id}/reject          -> invitation::reject
/// GET  /group/{id}                       -> get_by_id
/// GET  /group/by-proposal/{proposal_id}  -> get_by_proposal
/// POST /{id}/join                        -> join
/// GET  /{id}/due-date/{stage}            -> get_due_date
/// POST /{id}/due-date/{stage}            -> set_due_date
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/available", get(group::list_available))
        .route("/supervisor", get(group::list_supervisor))
        .route("/student", get(group::list_student))
        .route("/invite", post(invitation::send))
        .route("/invitations", get(invitation::list_mine))
        .route("/invitations/{id}/accept", post(invitation::accept))
        .route("/invitations/{id}/reject", post(invitation::reject))
        .route("/group/{id}", get(group::get_by_id))
        .route("/group/by-proposal/{proposal_id}", get(group::get_by_proposal))
        .route("/{id}/join", post(group::join))
        .route(
            "/{id}/due-date/{stage}",
            get(group::get_due_date).post(group::set_due_date),
        )
}
