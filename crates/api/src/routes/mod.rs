pub mod auth;
pub mod group;
pub mod health;
pub mod notification;
pub mod proposal;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
///
/// /proposals                                       list, create
/// /proposals/my-proposals                          own proposals (supervisor)
/// /proposals/{id}                                  get, update, delete
/// /proposals/{id}/submit                           draft -> submitted
/// /proposals/{id}/approve                          submitted -> approved (coordinator)
/// /proposals/{id}/reject                           submitted -> rejected (coordinator)
/// /proposals/{id}/join-request                     create join request (student)
/// /proposals/join-requests/supervisor              pending requests for caller's proposals
/// /proposals/join-requests/{id}/approve            approve request (owning supervisor)
/// /proposals/join-requests/{id}/reject             reject request (owning supervisor)
///
/// /groups/available                                approved groups with room
/// /groups/supervisor                               groups of caller's proposals
/// /groups/student                                  groups the caller belongs to
/// /groups/invite                                   send invitation (member)
/// /groups/invitations                              invitations addressed to caller
/// /groups/invitations/{id}/accept                  accept invitation (recipient)
/// /groups/invitations/{id}/reject                  reject invitation (recipient)
/// /groups/group/{id}                               get one group
/// /groups/group/by-proposal/{proposal_id}          get group by proposal
/// /groups/{id}/join                                direct join (student)
/// /groups/{id}/due-date/{stage}                    get, set stage due date
///
/// /notifications                                   list (?unread_only, limit, offset)
/// /notifications/read-all                          mark all read (POST)
/// /notifications/unread-count                      unread count (GET)
/// /notifications/{id}/read                         mark read (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication routes (login, refresh, logout).
        .nest("/auth", auth::router())
        // Proposal lifecycle and the join-request workflow it hosts.
        .nest("/proposals", proposal::router())
        // Group listings, direct joins, invitations, due dates.
        .nest("/groups", group::router())
        // Dashboard notifications.
        .nest("/notifications", notification::router())
}
