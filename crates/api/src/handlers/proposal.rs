//! Handlers for the `/proposals` resource: the proposal lifecycle.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use cpms_core::error::CoreError;
use cpms_core::proposal::{self, ProposalStatus};
use cpms_core::types::DbId;
use cpms_db::models::proposal::{CreateProposal, Proposal, ProposalWithCount, UpdateProposal};
use cpms_db::repositories::{GroupRepo, ProposalRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAuth, RequireCoordinator, RequireStaff, RequireSupervisor};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Request body for `PUT /proposals/{id}/approve`. Feedback is optional.
#[derive(Debug, Default, Deserialize)]
pub struct ApproveRequest {
    pub feedback: Option<String>,
}

/// Request body for `PUT /proposals/{id}/reject`. Feedback is mandatory,
/// but deserialized as optional so the domain guard owns the error.
#[derive(Debug, Default, Deserialize)]
pub struct RejectRequest {
    pub feedback: Option<String>,
}

/// POST /api/v1/proposals
///
/// Create a proposal in `draft`, owned by the calling supervisor.
pub async fn create(
    State(state): State<AppState>,
    RequireSupervisor(user): RequireSupervisor,
    Json(input): Json<CreateProposal>,
) -> AppResult<(StatusCode, Json<ApiResponse<Proposal>>)> {
    proposal::validate_new(
        &input.title,
        &input.tech_stack,
        &input.summary,
        input.max_students,
    )?;

    let created = ProposalRepo::create(&state.pool, user.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(created))))
}

/// GET /api/v1/proposals
pub async fn list(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
) -> AppResult<Json<ApiResponse<Vec<ProposalWithCount>>>> {
    let proposals = ProposalRepo::list_with_counts(&state.pool).await?;
    Ok(Json(ApiResponse::new(proposals)))
}

/// GET /api/v1/proposals/my-proposals
pub async fn my_proposals(
    State(state): State<AppState>,
    RequireSupervisor(user): RequireSupervisor,
) -> AppResult<Json<ApiResponse<Vec<ProposalWithCount>>>> {
    let proposals = ProposalRepo::list_by_supervisor(&state.pool, user.user_id).await?;
    Ok(Json(ApiResponse::new(proposals)))
}

/// GET /api/v1/proposals/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<ProposalWithCount>>> {
    let found = ProposalRepo::find_with_count(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Proposal",
            id,
        }))?;
    Ok(Json(ApiResponse::new(found)))
}

/// PUT /api/v1/proposals/{id}
///
/// Update a draft or rejected proposal. Editing a rejected proposal
/// resets it to draft and clears the stored feedback in the same write.
pub async fn update(
    State(state): State<AppState>,
    RequireSupervisor(user): RequireSupervisor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProposal>,
) -> AppResult<Json<ApiResponse<Proposal>>> {
    let existing = ProposalRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Proposal",
            id,
        }))?;

    proposal::ensure_owner(existing.supervisor_id, user.user_id)?;
    proposal::validate_update(
        input.title.as_deref(),
        input.tech_stack.as_deref(),
        input.summary.as_deref(),
        input.max_students,
    )?;

    let status: ProposalStatus = existing.status.parse()?;
    let outcome = proposal::edit(status)?;

    let updated = ProposalRepo::update(
        &state.pool,
        id,
        &input,
        outcome.next_status.as_str(),
        outcome.clear_feedback,
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Proposal",
        id,
    }))?;

    Ok(Json(ApiResponse::new(updated)))
}

/// PUT /api/v1/proposals/{id}/submit
pub async fn submit(
    State(state): State<AppState>,
    RequireSupervisor(user): RequireSupervisor,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Proposal>>> {
    let existing = ProposalRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Proposal",
            id,
        }))?;

    proposal::ensure_owner(existing.supervisor_id, user.user_id)?;

    let status: ProposalStatus = existing.status.parse()?;
    let next = proposal::submit(status)?;

    let updated = ProposalRepo::set_status(&state.pool, id, next.as_str(), None)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Proposal",
            id,
        }))?;

    Ok(Json(ApiResponse::new(updated)))
}

/// PUT /api/v1/proposals/{id}/approve
///
/// Approve a submitted proposal and ensure its 1:1 group exists. The
/// status flip and the group creation commit together.
pub async fn approve(
    State(state): State<AppState>,
    RequireCoordinator(_user): RequireCoordinator,
    Path(id): Path<DbId>,
    input: Option<Json<ApproveRequest>>,
) -> AppResult<Json<ApiResponse<Proposal>>> {
    let feedback = input.and_then(|Json(body)| body.feedback);

    let mut tx = state.pool.begin().await?;

    let existing = ProposalRepo::find_by_id_for_update(&mut *tx, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Proposal",
            id,
        }))?;

    let status: ProposalStatus = existing.status.parse()?;
    let next = proposal::approve(status)?;

    let updated = ProposalRepo::set_status(&mut *tx, id, next.as_str(), feedback.as_deref())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Proposal",
            id,
        }))?;

    // Idempotent: a second approval attempt fails the status guard above,
    // and re-running ensure never creates a second group.
    GroupRepo::ensure_for_proposal(&mut tx, id).await?;

    tx.commit().await?;

    Ok(Json(ApiResponse::new(updated)))
}

/// PUT /api/v1/proposals/{id}/reject
///
/// Reject a submitted proposal. Feedback is required and stored verbatim.
pub async fn reject(
    State(state): State<AppState>,
    RequireCoordinator(_user): RequireCoordinator,
    Path(id): Path<DbId>,
    input: Option<Json<RejectRequest>>,
) -> AppResult<Json<ApiResponse<Proposal>>> {
    let feedback = input.and_then(|Json(body)| body.feedback);

    let existing = ProposalRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Proposal",
            id,
        }))?;

    let status: ProposalStatus = existing.status.parse()?;
    let next = proposal::reject(status, feedback.as_deref())?;

    let updated = ProposalRepo::set_status(&state.pool, id, next.as_str(), feedback.as_deref())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Proposal",
            id,
        }))?;

    Ok(Json(ApiResponse::new(updated)))
}

/// DELETE /api/v1/proposals/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireSupervisor(user): RequireSupervisor,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let existing = ProposalRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Proposal",
            id,
        }))?;

    proposal::ensure_owner(existing.supervisor_id, user.user_id)?;

    let status: ProposalStatus = existing.status.parse()?;
    proposal::ensure_deletable(status)?;

    ProposalRepo::delete(&state.pool, id).await?;

    Ok(Json(ApiResponse::new(serde_json::json!({}))))
}
