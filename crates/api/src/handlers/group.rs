//! Handlers for the `/groups` resource: group listings, direct joins,
//! and per-stage due dates.

use axum::extract::{Path, State};
use axum::Json;
use cpms_core::error::CoreError;
use cpms_core::stages::Stage;
use cpms_core::types::{DbId, Timestamp};
use cpms_db::models::group::{ProjectGroup, SetDueDate};
use cpms_db::models::proposal::ProposalWithCount;
use cpms_db::models::user::UserInfo;
use cpms_db::repositories::{GroupRepo, ProposalRepo};
use cpms_db::DbPool;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAuth, RequireStudent, RequireSupervisor};
use crate::response::ApiResponse;
use crate::state::AppState;

/// A group joined with its proposal and member list.
#[derive(Debug, Serialize)]
pub struct GroupView {
    #[serde(flatten)]
    pub group: ProjectGroup,
    pub proposal: ProposalWithCount,
    pub members: Vec<UserInfo>,
}

/// A stage due date as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueDateView {
    pub stage: String,
    pub due_date: Option<Timestamp>,
    pub active: bool,
}

/// Assemble the full view of a group (proposal with count + members).
async fn build_view(pool: &DbPool, group: ProjectGroup) -> AppResult<GroupView> {
    let proposal = ProposalRepo::find_with_count(pool, group.proposal_id)
        .await?
        .ok_or_else(|| {
            AppError::InternalError(format!(
                "Group {} references missing proposal {}",
                group.id, group.proposal_id
            ))
        })?;
    let members = GroupRepo::members(pool, group.id).await?;
    Ok(GroupView {
        group,
        proposal,
        members,
    })
}

async fn build_views(pool: &DbPool, groups: Vec<ProjectGroup>) -> AppResult<Vec<GroupView>> {
    let mut views = Vec::with_capacity(groups.len());
    for group in groups {
        views.push(build_view(pool, group).await?);
    }
    Ok(views)
}

/// GET /api/v1/groups/available
///
/// Groups of approved proposals that still have room.
pub async fn list_available(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> AppResult<Json<ApiResponse<Vec<GroupView>>>> {
    let groups = GroupRepo::list_available(&state.pool).await?;
    Ok(Json(ApiResponse::new(build_views(&state.pool, groups).await?)))
}

/// POST /api/v1/groups/{id}/join
///
/// Direct join: the caller becomes a member if they are not one already
/// and the group has room. Membership insert and capacity check share a
/// transaction with the proposal row locked.
pub async fn join(
    State(state): State<AppState>,
    RequireStudent(user): RequireStudent,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<GroupView>>> {
    let group = GroupRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ProjectGroup",
            id,
        }))?;

    let mut tx = state.pool.begin().await?;

    let target = ProposalRepo::find_by_id_for_update(&mut *tx, group.proposal_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Proposal",
            id: group.proposal_id,
        }))?;

    if GroupRepo::is_member(&mut *tx, group.id, user.user_id).await? {
        return Err(AppError::Core(CoreError::Duplicate(
            "Already joined this project".into(),
        )));
    }

    let confirmed = GroupRepo::member_count(&mut *tx, group.id).await?;
    if confirmed >= i64::from(target.max_students) {
        return Err(AppError::Core(CoreError::CapacityExceeded(
            "Project is full".into(),
        )));
    }

    GroupRepo::add_member(&mut *tx, group.id, user.user_id).await?;

    tx.commit().await?;

    let view = build_view(&state.pool, group).await?;
    Ok(Json(ApiResponse::new(view)))
}

/// GET /api/v1/groups/supervisor
pub async fn list_supervisor(
    State(state): State<AppState>,
    RequireSupervisor(user): RequireSupervisor,
) -> AppResult<Json<ApiResponse<Vec<GroupView>>>> {
    let groups = GroupRepo::list_by_supervisor(&state.pool, user.user_id).await?;
    Ok(Json(ApiResponse::new(build_views(&state.pool, groups).await?)))
}

/// GET /api/v1/groups/student
pub async fn list_student(
    State(state): State<AppState>,
    RequireStudent(user): RequireStudent,
) -> AppResult<Json<ApiResponse<Vec<GroupView>>>> {
    let groups = GroupRepo::list_by_student(&state.pool, user.user_id).await?;
    Ok(Json(ApiResponse::new(build_views(&state.pool, groups).await?)))
}

/// GET /api/v1/groups/group/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<GroupView>>> {
    let group = GroupRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ProjectGroup",
            id,
        }))?;
    let view = build_view(&state.pool, group).await?;
    Ok(Json(ApiResponse::new(view)))
}

/// GET /api/v1/groups/group/by-proposal/{proposal_id}
pub async fn get_by_proposal(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(proposal_id): Path<DbId>,
) -> AppResult<Json<ApiResponse<GroupView>>> {
    let group = GroupRepo::find_by_proposal(&state.pool, proposal_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ProjectGroup",
            id: proposal_id,
        }))?;
    let view = build_view(&state.pool, group).await?;
    Ok(Json(ApiResponse::new(view)))
}

/// GET /api/v1/groups/{id}/due-date/{stage}
///
/// An unset stage reads as no date and inactive.
pub async fn get_due_date(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path((id, stage)): Path<(DbId, String)>,
) -> AppResult<Json<ApiResponse<DueDateView>>> {
    let stage: Stage = stage.parse()?;

    let group = GroupRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ProjectGroup",
            id,
        }))?;

    let row = GroupRepo::get_due_date(&state.pool, group.id, stage.as_str()).await?;
    let view = match row {
        Some(d) => DueDateView {
            stage: d.stage,
            due_date: d.due_date,
            active: d.is_active,
        },
        None => DueDateView {
            stage: stage.as_str().to_string(),
            due_date: None,
            active: false,
        },
    };
    Ok(Json(ApiResponse::new(view)))
}

/// POST /api/v1/groups/{id}/due-date/{stage}
///
/// Set or replace one stage's due date. No cross-stage ordering is
/// validated.
pub async fn set_due_date(
    State(state): State<AppState>,
    RequireSupervisor(_user): RequireSupervisor,
    Path((id, stage)): Path<(DbId, String)>,
    Json(input): Json<SetDueDate>,
) -> AppResult<Json<ApiResponse<DueDateView>>> {
    let stage: Stage = stage.parse()?;

    let group = GroupRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ProjectGroup",
            id,
        }))?;

    let row = GroupRepo::upsert_due_date(
        &state.pool,
        group.id,
        stage.as_str(),
        input.due_date,
        input.active.unwrap_or(false),
    )
    .await?;

    Ok(Json(ApiResponse::new(DueDateView {
        stage: row.stage,
        due_date: row.due_date,
        active: row.is_active,
    })))
}
