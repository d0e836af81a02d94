//! Shared response envelope types for API handlers.
//!
//! Every successful response uses the `{ "success": true, "data": ... }`
//! envelope; [`crate::error::AppError`] produces the matching
//! `{ "success": false, "error": ... }` failure shape. Use
//! [`ApiResponse`] instead of ad-hoc `serde_json::json!` to get
//! compile-time type safety and consistent serialization.

use serde::Serialize;

/// Standard `{ "success": true, "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
