//! Best-effort dashboard notification sink.
//!
//! Notifications never fail the operation that emits them: storage
//! errors are logged at warn level and swallowed.

use cpms_core::types::DbId;
use cpms_db::repositories::NotificationRepo;
use cpms_db::DbPool;

/// Notification kind for a new join request on a supervisor's proposal.
pub const KIND_JOIN_REQUEST: &str = "join_request";

/// Record a dashboard notification for a user.
pub async fn notify(
    pool: &DbPool,
    recipient_id: DbId,
    kind: &str,
    message: &str,
    related_id: Option<DbId>,
) {
    if let Err(err) = NotificationRepo::create(pool, recipient_id, kind, message, related_id).await
    {
        tracing::warn!(
            recipient_id,
            kind,
            error = %err,
            "Failed to record notification"
        );
    }
}
