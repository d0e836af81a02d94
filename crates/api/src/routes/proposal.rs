//! Route definitions for the `/proposals` resource, including the
//! join-request workflow mounted under the same prefix.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{join_request, proposal};
use crate::state::AppState;

/// Routes mounted at `/proposals`.
///
/// ```text
/// POST   /                              -> create (supervisor)
/// GET    /                              -> list (coordinator | supervisor)
/// GET    /my-proposals                  -> my_proposals (supervisor)
/// GET    /{id}                          -> get_by_id (any authed)
/// PUT    /{id}                          -> update (owner supervisor)
/// DELETE /{id}                          -> delete (owner supervisor)
/// PUT    /{id}/submit                   -> submit (owner supervisor)
/// PUT    /{id}/approve                  -> approve (coordinator)
/// PUT    /{id}/reject                   -> reject (coordinator)
/// POST   /{id}/join-request             -> join_request::create (student)
/// GET    /join-requests/supervisor      -> join_request::list_supervisor
/// POST   /join-requests/{id}/approve    -> join_request::approve
/// POST   /join-requests/{id}/reject     -> join_request::reject
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(proposal::create).get(proposal::list))
        .route("/my-proposals", get(proposal::my_proposals))
        .route(
            "/{id}",
            get(proposal::get_by_id)
                .put(proposal::update)
                .delete(proposal::delete),
        )
        .route("/{id}/submit", put(proposal::submit))
        .route("/{id}/approve", put(proposal::approve))
        .route("/{id}/reject", put(proposal::reject))
        .route("/{id}/join-request", post(join_request::create))
        .route(
            "/join-requests/supervisor",
            get(join_request::list_supervisor),
        )
        .route("/join-requests/{id}/approve", post(join_request::approve))
        .route("/join-requests/{id}/reject", post(join_request::reject))
}
