//! Handlers for the join-request workflow.
//!
//! Students request admission to a proposal as a batch; the owning
//! supervisor approves or rejects. Approval checks capacity and admits
//! the whole batch into the proposal's group in one transaction.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use cpms_core::capacity;
use cpms_core::error::CoreError;
use cpms_core::join_request::{self, JoinRequestStatus};
use cpms_core::proposal;
use cpms_core::types::DbId;
use cpms_db::models::join_request::{CreateJoinRequest, JoinRequest};
use cpms_db::models::proposal::ProposalWithCount;
use cpms_db::models::user::UserInfo;
use cpms_db::repositories::{GroupRepo, JoinRequestRepo, ProposalRepo, UserRepo};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireStudent, RequireSupervisor};
use crate::notifications::{self, KIND_JOIN_REQUEST};
use crate::response::ApiResponse;
use crate::state::AppState;

/// A join request joined with its proposal and student batch, as shown
/// on the supervisor's review list.
#[derive(Debug, Serialize)]
pub struct JoinRequestView {
    #[serde(flatten)]
    pub request: JoinRequest,
    pub proposal: ProposalWithCount,
    pub students: Vec<UserInfo>,
}

/// POST /api/v1/proposals/{id}/join-request
///
/// Create a pending request for a batch of students. The supervisor is
/// notified on the dashboard and by best-effort email; email failure
/// never fails the request.
pub async fn create(
    State(state): State<AppState>,
    RequireStudent(_user): RequireStudent,
    Path(proposal_id): Path<DbId>,
    Json(input): Json<CreateJoinRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<JoinRequest>>)> {
    join_request::validate_batch(&input.student_ids)?;

    let target = ProposalRepo::find_by_id(&state.pool, proposal_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Proposal",
            id: proposal_id,
        }))?;

    // An existing pending request already covering this batch is a duplicate.
    if JoinRequestRepo::find_pending_covering(&state.pool, proposal_id, &input.student_ids)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Duplicate(
            "Request already exists for these students".into(),
        )));
    }

    let mut tx = state.pool.begin().await?;
    let request = JoinRequestRepo::create(&mut tx, proposal_id, &input.student_ids).await?;
    tx.commit().await?;

    notifications::notify(
        &state.pool,
        target.supervisor_id,
        KIND_JOIN_REQUEST,
        &format!(
            "A group of students has requested to join your proposal: {}",
            target.title
        ),
        Some(request.id),
    )
    .await;

    // Fire-and-forget email to the supervisor.
    if let Some(supervisor) = UserRepo::find_by_id(&state.pool, target.supervisor_id).await? {
        let students = UserRepo::find_info_by_ids(&state.pool, &input.student_ids)
            .await
            .unwrap_or_default();
        let group_info = students
            .iter()
            .map(|s| format!("{} {} ({})", s.first_name, s.last_name, s.email))
            .collect::<Vec<_>>()
            .join(", ");

        let mailer = Arc::clone(&state.mailer);
        let title = target.title.clone();
        tokio::spawn(async move {
            if let Err(err) = mailer
                .send_join_request_notification(&supervisor.email, &title, &group_info)
                .await
            {
                tracing::warn!(error = %err, "Failed to send join-request email");
            }
        });
    }

    Ok((StatusCode::CREATED, Json(ApiResponse::new(request))))
}

/// GET /api/v1/proposals/join-requests/supervisor
///
/// All pending requests across the caller's proposals, newest first.
pub async fn list_supervisor(
    State(state): State<AppState>,
    RequireSupervisor(user): RequireSupervisor,
) -> AppResult<Json<ApiResponse<Vec<JoinRequestView>>>> {
    let requests = JoinRequestRepo::list_pending_for_supervisor(&state.pool, user.user_id).await?;

    let mut views = Vec::with_capacity(requests.len());
    for request in requests {
        let target = ProposalRepo::find_with_count(&state.pool, request.proposal_id)
            .await?
            .ok_or_else(|| {
                AppError::InternalError(format!(
                    "Join request {} references missing proposal {}",
                    request.id, request.proposal_id
                ))
            })?;
        let ids = JoinRequestRepo::student_ids(&state.pool, request.id).await?;
        let students = UserRepo::find_info_by_ids(&state.pool, &ids).await?;
        views.push(JoinRequestView {
            request,
            proposal: target,
            students,
        });
    }

    Ok(Json(ApiResponse::new(views)))
}

/// POST /api/v1/proposals/join-requests/{id}/approve
///
/// Approve a pending request. The capacity read, the status flip, and
/// the member inserts share one transaction with the proposal row
/// locked, so concurrent approvals cannot overrun `max_students`.
pub async fn approve(
    State(state): State<AppState>,
    RequireSupervisor(user): RequireSupervisor,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<JoinRequest>>> {
    let request = JoinRequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "JoinRequest",
            id,
        }))?;

    let status: JoinRequestStatus = request.status.parse()?;
    join_request::ensure_pending(status)?;

    let mut tx = state.pool.begin().await?;

    let target = ProposalRepo::find_by_id_for_update(&mut *tx, request.proposal_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Proposal",
            id: request.proposal_id,
        }))?;

    proposal::ensure_owner(target.supervisor_id, user.user_id)?;

    let students = JoinRequestRepo::student_ids(&mut *tx, request.id).await?;
    let group = GroupRepo::ensure_for_proposal(&mut tx, target.id).await?;
    let confirmed = GroupRepo::member_count(&mut *tx, group.id).await?;

    capacity::ensure_can_accept(confirmed, target.max_students, students.len())?;

    // The `status = 'pending'` guard catches a request that raced to a
    // terminal state between our read and this write.
    let changed =
        JoinRequestRepo::set_status(&mut *tx, id, JoinRequestStatus::Approved.as_str()).await?;
    if !changed {
        return Err(AppError::Core(CoreError::InvalidState(
            "Request already processed".into(),
        )));
    }

    GroupRepo::add_members(&mut *tx, group.id, &students).await?;

    tx.commit().await?;

    let updated = JoinRequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "JoinRequest",
            id,
        }))?;

    Ok(Json(ApiResponse::new(updated)))
}

/// POST /api/v1/proposals/join-requests/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    RequireSupervisor(user): RequireSupervisor,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<JoinRequest>>> {
    let request = JoinRequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "JoinRequest",
            id,
        }))?;

    let target = ProposalRepo::find_by_id(&state.pool, request.proposal_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Proposal",
            id: request.proposal_id,
        }))?;

    proposal::ensure_owner(target.supervisor_id, user.user_id)?;

    let status: JoinRequestStatus = request.status.parse()?;
    join_request::ensure_pending(status)?;

    JoinRequestRepo::set_status(&state.pool, id, JoinRequestStatus::Rejected.as_str()).await?;

    let updated = JoinRequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "JoinRequest",
            id,
        }))?;

    Ok(Json(ApiResponse::new(updated)))
}
