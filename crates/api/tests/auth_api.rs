//! HTTP-level integration tests for auth endpoints and RBAC enforcement.
//!
//! Tests cover login, token refresh and rotation, logout, account
//! lockout, and role gates on domain routes.

mod common;

use axum::http::StatusCode;
use common::{auth_user, body_json, create_test_user, get, get_auth, post_json, post_json_auth};
use cpms_db::repositories::UserRepo;
use sqlx::PgPool;

/// Log in a user via the API and return the JSON response payload.
async fn login_response(pool: &PgPool, email: &str, password: &str) -> serde_json::Value {
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "email": email, "password": password });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Auth flow tests
// ---------------------------------------------------------------------------

/// Successful login returns 200 with tokens and user info.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_success(pool: PgPool) {
    let (user, password) = create_test_user(&pool, "login@uni.edu", "supervisor").await;

    let json = login_response(&pool, "login@uni.edu", &password).await;

    assert_eq!(json["success"], true);
    assert!(json["data"]["access_token"].is_string());
    assert!(json["data"]["refresh_token"].is_string());
    assert!(json["data"]["expires_in"].is_number());
    assert_eq!(json["data"]["user"]["id"], user.id);
    assert_eq!(json["data"]["user"]["email"], "login@uni.edu");
    assert_eq!(json["data"]["user"]["role"], "supervisor");
}

/// Login with an incorrect password returns 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_wrong_password(pool: PgPool) {
    let (_user, _password) = create_test_user(&pool, "wrongpw@uni.edu", "student").await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "email": "wrongpw@uni.edu", "password": "incorrect" });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Login with a nonexistent email returns 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_nonexistent_user(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "email": "ghost@uni.edu", "password": "whatever" });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Login to a deactivated account returns 403.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_inactive_user(pool: PgPool) {
    let (user, password) = create_test_user(&pool, "inactive@uni.edu", "student").await;
    UserRepo::deactivate(&pool, user.id)
        .await
        .expect("deactivation should succeed");

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "email": "inactive@uni.edu", "password": password });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// A valid refresh token returns new tokens, and the refresh token rotates.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_token_refresh_rotates(pool: PgPool) {
    let (_user, password) = create_test_user(&pool, "refresher@uni.edu", "student").await;

    let login_json = login_response(&pool, "refresher@uni.edu", &password).await;
    let refresh_token = login_json["data"]["refresh_token"].as_str().unwrap();

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "refresh_token": refresh_token });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["access_token"].is_string());
    assert_ne!(
        json["data"]["refresh_token"].as_str().unwrap(),
        refresh_token,
        "refresh token must rotate on use"
    );

    // The rotated-out token no longer works.
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "refresh_token": refresh_token });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Refreshing with a garbage token returns 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_refresh_with_invalid_token(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "refresh_token": "not-a-real-token" });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Logout revokes sessions and returns 204 No Content.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_logout(pool: PgPool) {
    let (_user, password) = create_test_user(&pool, "logout@uni.edu", "student").await;

    let login_json = login_response(&pool, "logout@uni.edu", &password).await;
    let access_token = login_json["data"]["access_token"].as_str().unwrap();
    let refresh_token = login_json["data"]["refresh_token"].as_str().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/auth/logout",
        serde_json::json!({}),
        access_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The revoked refresh token is dead.
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "refresh_token": refresh_token });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Account lockout: after 5 failed login attempts the account is locked.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_account_lockout(pool: PgPool) {
    let (_user, _password) = create_test_user(&pool, "lockme@uni.edu", "student").await;

    // Fail login 5 times with the wrong password to trigger the lock.
    for _ in 0..5 {
        let app = common::build_test_app(pool.clone());
        let body = serde_json::json!({ "email": "lockme@uni.edu", "password": "wrong_pass" });
        let response = post_json(app, "/api/v1/auth/login", body).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // The 6th attempt (even with the wrong password) should return 403 (locked).
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "email": "lockme@uni.edu", "password": "wrong_pass" });
    let response = post_json(app, "/api/v1/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    let error_msg = json["error"].as_str().unwrap_or("");
    assert!(
        error_msg.contains("locked"),
        "error message should mention the account is locked, got: {error_msg}"
    );
}

// ---------------------------------------------------------------------------
// RBAC enforcement tests
// ---------------------------------------------------------------------------

/// Domain endpoints require authentication -- missing token returns 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_proposals_require_auth(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = get(app, "/api/v1/proposals").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// The proposal list is staff-only: students are forbidden, examiners too.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_proposal_list_is_staff_only(pool: PgPool) {
    let (_student, student_token) = auth_user(&pool, "stud@uni.edu", "student").await;
    let (_examiner, examiner_token) = auth_user(&pool, "exam@uni.edu", "examiner").await;
    let (_coordinator, coord_token) = auth_user(&pool, "coord@uni.edu", "coordinator").await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/proposals", &student_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/proposals", &examiner_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/proposals", &coord_token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// A forged token signed with the wrong secret is rejected.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_forged_token_rejected(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/proposals", "forged.token.value").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
