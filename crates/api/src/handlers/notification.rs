//! Handlers for the `/notifications` resource.

use axum::extract::{Path, Query, State};
use axum::Json;
use cpms_core::error::CoreError;
use cpms_core::types::DbId;
use cpms_db::models::notification::Notification;
use cpms_db::repositories::NotificationRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Query parameters for `GET /notifications`.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// When `true`, only unread notifications are returned.
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Payload for `GET /notifications/unread-count`.
#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}

/// GET /api/v1/notifications
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(params): Query<ListParams>,
) -> AppResult<Json<ApiResponse<Vec<Notification>>>> {
    let limit = params.limit.unwrap_or(50).clamp(1, 200);
    let offset = params.offset.unwrap_or(0).max(0);

    let notifications = NotificationRepo::list_for_user(
        &state.pool,
        user.user_id,
        params.unread_only,
        limit,
        offset,
    )
    .await?;

    Ok(Json(ApiResponse::new(notifications)))
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> AppResult<Json<ApiResponse<UnreadCount>>> {
    let count = NotificationRepo::unread_count(&state.pool, user.user_id).await?;
    Ok(Json(ApiResponse::new(UnreadCount { count })))
}

/// POST /api/v1/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let marked = NotificationRepo::mark_all_read(&state.pool, user.user_id).await?;
    Ok(Json(ApiResponse::new(serde_json::json!({ "marked": marked }))))
}

/// POST /api/v1/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let marked = NotificationRepo::mark_read(&state.pool, id, user.user_id).await?;
    if !marked {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Notification",
            id,
        }));
    }
    Ok(Json(ApiResponse::new(serde_json::json!({}))))
}
