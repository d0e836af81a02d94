//! Handlers for the peer-to-peer invitation workflow.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use cpms_core::error::CoreError;
use cpms_core::invitation::{self, InvitationStatus, RecipientRef};
use cpms_core::types::DbId;
use cpms_db::models::group::ProjectGroup;
use cpms_db::models::invitation::Invitation;
use cpms_db::models::user::UserInfo;
use cpms_db::repositories::{GroupRepo, InvitationRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAuth, RequireStudent};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Request body for `POST /groups/invite`. `to` is an internal user id
/// or an email address; `project` is the target group id.
#[derive(Debug, Deserialize)]
pub struct SendInvitation {
    pub to: String,
    pub project: DbId,
}

/// An invitation joined with its group and sender, as shown on the
/// recipient's list.
#[derive(Debug, Serialize)]
pub struct InvitationView {
    #[serde(flatten)]
    pub invitation: Invitation,
    pub group: ProjectGroup,
    pub from: UserInfo,
}

/// POST /api/v1/groups/invite
///
/// A group member invites another student. The recipient is resolved by
/// id or email; at most one pending invitation may exist per
/// (group, sender, recipient) triple.
pub async fn send(
    State(state): State<AppState>,
    RequireStudent(user): RequireStudent,
    Json(input): Json<SendInvitation>,
) -> AppResult<(StatusCode, Json<ApiResponse<Invitation>>)> {
    let group = GroupRepo::find_by_id(&state.pool, input.project)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ProjectGroup",
            id: input.project,
        }))?;

    if !GroupRepo::is_member(&state.pool, group.id, user.user_id).await? {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only group members can send invitations".into(),
        )));
    }

    let recipient = match RecipientRef::parse(&input.to)? {
        RecipientRef::ById(id) => UserRepo::find_by_id(&state.pool, id).await?,
        RecipientRef::ByEmail(email) => UserRepo::find_by_email(&state.pool, &email).await?,
    }
    .ok_or_else(|| AppError::NotFound("Recipient user not found".into()))?;

    if InvitationRepo::pending_exists(&state.pool, group.id, user.user_id, recipient.id).await? {
        return Err(AppError::Core(CoreError::Duplicate(
            "Invitation already sent".into(),
        )));
    }

    let created = InvitationRepo::create(&state.pool, group.id, user.user_id, recipient.id).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(created))))
}

/// GET /api/v1/groups/invitations
///
/// Invitations addressed to the caller, newest first.
pub async fn list_mine(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> AppResult<Json<ApiResponse<Vec<InvitationView>>>> {
    let invitations = InvitationRepo::list_for_recipient(&state.pool, user.user_id).await?;

    let mut views = Vec::with_capacity(invitations.len());
    for inv in invitations {
        let group = GroupRepo::find_by_id(&state.pool, inv.group_id)
            .await?
            .ok_or_else(|| {
                AppError::InternalError(format!(
                    "Invitation {} references missing group {}",
                    inv.id, inv.group_id
                ))
            })?;
        let senders = UserRepo::find_info_by_ids(&state.pool, &[inv.from_user_id]).await?;
        let from = senders.into_iter().next().ok_or_else(|| {
            AppError::InternalError(format!(
                "Invitation {} references missing sender {}",
                inv.id, inv.from_user_id
            ))
        })?;
        views.push(InvitationView {
            invitation: inv,
            group,
            from,
        });
    }

    Ok(Json(ApiResponse::new(views)))
}

/// POST /api/v1/groups/invitations/{id}/accept
///
/// Accept an invitation: the recipient joins the group. The member add
/// is an idempotent set-add, and capacity is NOT re-checked on this
/// path -- invitations bypass the capacity policy (see DESIGN.md).
pub async fn accept(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Invitation>>> {
    let inv = InvitationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Invitation",
            id,
        }))?;

    invitation::ensure_recipient(inv.to_user_id, user.user_id)?;

    let status: InvitationStatus = inv.status.parse()?;
    invitation::ensure_pending(status)?;

    let mut tx = state.pool.begin().await?;

    let changed =
        InvitationRepo::set_status(&mut *tx, id, InvitationStatus::Accepted.as_str()).await?;
    if !changed {
        return Err(AppError::Core(CoreError::InvalidState(
            "Invitation already processed".into(),
        )));
    }

    GroupRepo::add_member(&mut *tx, inv.group_id, user.user_id).await?;

    tx.commit().await?;

    let updated = InvitationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Invitation",
            id,
        }))?;

    Ok(Json(ApiResponse::new(updated)))
}

/// POST /api/v1/groups/invitations/{id}/reject
///
/// Reject an invitation. Terminal, no side effect.
pub async fn reject(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<Invitation>>> {
    let inv = InvitationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Invitation",
            id,
        }))?;

    invitation::ensure_recipient(inv.to_user_id, user.user_id)?;

    let status: InvitationStatus = inv.status.parse()?;
    invitation::ensure_pending(status)?;

    InvitationRepo::set_status(&state.pool, id, InvitationStatus::Rejected.as_str()).await?;

    let updated = InvitationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Invitation",
            id,
        }))?;

    Ok(Json(ApiResponse::new(updated)))
}
