//! HTTP-level integration tests for the join-request workflow.
//!
//! Covers batch validation, the duplicate guard, capacity-checked
//! approval, supervisor notifications, and the serialized capacity
//! invariant `current_students <= max_students`.

mod common;

use axum::http::StatusCode;
use common::{auth_user, body_json, get_auth, post_json_auth, put_json_auth};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create an approved proposal owned by `sup_token`'s user and return its id.
async fn approved_proposal(
    pool: &PgPool,
    sup_token: &str,
    coord_token: &str,
    max_students: i64,
) -> i64 {
    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({
        "title": "Campus energy dashboard",
        "techStack": ["Rust", "PostgreSQL"],
        "summary": "Aggregate building power meters into a live dashboard.",
        "maxStudents": max_students,
        "semester": "2026-Fall"
    });
    let response = post_json_auth(app, "/api/v1/proposals", body, sup_token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/proposals/{id}/submit"),
        serde_json::json!({}),
        sup_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/proposals/{id}/approve"),
        serde_json::json!({}),
        coord_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    id
}

/// Create a join request for the given students, returning the response.
async fn create_request(
    pool: &PgPool,
    student_token: &str,
    proposal_id: i64,
    student_ids: &[i64],
) -> axum::response::Response {
    let app = common::build_test_app(pool.clone());
    post_json_auth(
        app,
        &format!("/api/v1/proposals/{proposal_id}/join-request"),
        serde_json::json!({ "studentIds": student_ids }),
        student_token,
    )
    .await
}

/// Approve a join request, returning the response.
async fn approve_request(
    pool: &PgPool,
    sup_token: &str,
    request_id: i64,
) -> axum::response::Response {
    let app = common::build_test_app(pool.clone());
    post_json_auth(
        app,
        &format!("/api/v1/proposals/join-requests/{request_id}/approve"),
        serde_json::json!({}),
        sup_token,
    )
    .await
}

/// Read a proposal's `current_students` via the API.
async fn current_students(pool: &PgPool, token: &str, proposal_id: i64) -> i64 {
    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("/api/v1/proposals/{proposal_id}"), token).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"]["current_students"]
        .as_i64()
        .expect("current_students should be a number")
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Creating a request stores the batch pending and notifies the supervisor.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_join_request(pool: PgPool) {
    let (supervisor, sup_token) = auth_user(&pool, "sup@uni.edu", "supervisor").await;
    let (_coordinator, coord_token) = auth_user(&pool, "coord@uni.edu", "coordinator").await;
    let (student_a, a_token) = auth_user(&pool, "ada@uni.edu", "student").await;
    let (student_b, _b_token) = auth_user(&pool, "bob@uni.edu", "student").await;

    let proposal_id = approved_proposal(&pool, &sup_token, &coord_token, 3).await;

    let response = create_request(&pool, &a_token, proposal_id, &[student_a.id, student_b.id]).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["status"], "pending");

    // The supervisor got a dashboard notification referencing the request.
    let notifications: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND kind = 'join_request'",
    )
    .bind(supervisor.id)
    .fetch_one(&pool)
    .await
    .expect("count should succeed");
    assert_eq!(notifications, 1);
}

/// An empty batch fails with 400.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_join_request_empty_batch(pool: PgPool) {
    let (_supervisor, sup_token) = auth_user(&pool, "sup@uni.edu", "supervisor").await;
    let (_coordinator, coord_token) = auth_user(&pool, "coord@uni.edu", "coordinator").await;
    let (_student, a_token) = auth_user(&pool, "ada@uni.edu", "student").await;

    let proposal_id = approved_proposal(&pool, &sup_token, &coord_token, 3).await;

    let response = create_request(&pool, &a_token, proposal_id, &[]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// A second identical pending request is a duplicate.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_duplicate_join_request(pool: PgPool) {
    let (_supervisor, sup_token) = auth_user(&pool, "sup@uni.edu", "supervisor").await;
    let (_coordinator, coord_token) = auth_user(&pool, "coord@uni.edu", "coordinator").await;
    let (student_a, a_token) = auth_user(&pool, "ada@uni.edu", "student").await;
    let (student_b, _b_token) = auth_user(&pool, "bob@uni.edu", "student").await;

    let proposal_id = approved_proposal(&pool, &sup_token, &coord_token, 3).await;

    let response = create_request(&pool, &a_token, proposal_id, &[student_a.id, student_b.id]).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = create_request(&pool, &a_token, proposal_id, &[student_a.id, student_b.id]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
}

/// A pending request whose student set covers the new batch also counts
/// as a duplicate (subset of an existing batch).
#[sqlx::test(migrations = "../db/migrations")]
async fn test_duplicate_join_request_subset(pool: PgPool) {
    let (_supervisor, sup_token) = auth_user(&pool, "sup@uni.edu", "supervisor").await;
    let (_coordinator, coord_token) = auth_user(&pool, "coord@uni.edu", "coordinator").await;
    let (student_a, a_token) = auth_user(&pool, "ada@uni.edu", "student").await;
    let (student_b, _b_token) = auth_user(&pool, "bob@uni.edu", "student").await;

    let proposal_id = approved_proposal(&pool, &sup_token, &coord_token, 3).await;

    let response = create_request(&pool, &a_token, proposal_id, &[student_a.id, student_b.id]).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // [A] is contained in the pending [A, B] request.
    let response = create_request(&pool, &a_token, proposal_id, &[student_a.id]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Approval and capacity
// ---------------------------------------------------------------------------

/// The §8.6 scenario: maxStudents=3, approve a batch of 2, then a second
/// batch of 2 must fail CapacityExceeded with the count unchanged.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_approval_capacity_scenario(pool: PgPool) {
    let (_supervisor, sup_token) = auth_user(&pool, "sup@uni.edu", "supervisor").await;
    let (_coordinator, coord_token) = auth_user(&pool, "coord@uni.edu", "coordinator").await;
    let (student_a, a_token) = auth_user(&pool, "ada@uni.edu", "student").await;
    let (student_b, _t1) = auth_user(&pool, "bob@uni.edu", "student").await;
    let (student_c, c_token) = auth_user(&pool, "cyd@uni.edu", "student").await;
    let (student_d, _t2) = auth_user(&pool, "dan@uni.edu", "student").await;

    let proposal_id = approved_proposal(&pool, &sup_token, &coord_token, 3).await;

    // First batch of two: approve succeeds, count reaches 2.
    let response = create_request(&pool, &a_token, proposal_id, &[student_a.id, student_b.id]).await;
    let first_id = body_json(response).await["data"]["id"].as_i64().unwrap();
    let response = approve_request(&pool, &sup_token, first_id).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "approved");
    assert_eq!(current_students(&pool, &sup_token, proposal_id).await, 2);

    // Second batch of two: 2 + 2 > 3, approval must fail and leave the
    // count at 2.
    let response = create_request(&pool, &c_token, proposal_id, &[student_c.id, student_d.id]).await;
    let second_id = body_json(response).await["data"]["id"].as_i64().unwrap();
    let response = approve_request(&pool, &sup_token, second_id).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(current_students(&pool, &sup_token, proposal_id).await, 2);

    // The failed approval left the request pending.
    let status: String = sqlx::query_scalar("SELECT status FROM join_requests WHERE id = $1")
        .bind(second_id)
        .fetch_one(&pool)
        .await
        .expect("status fetch should succeed");
    assert_eq!(status, "pending");
}

/// Approved batches become group members.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_approval_admits_batch_into_group(pool: PgPool) {
    let (_supervisor, sup_token) = auth_user(&pool, "sup@uni.edu", "supervisor").await;
    let (_coordinator, coord_token) = auth_user(&pool, "coord@uni.edu", "coordinator").await;
    let (student_a, a_token) = auth_user(&pool, "ada@uni.edu", "student").await;
    let (student_b, _b_token) = auth_user(&pool, "bob@uni.edu", "student").await;

    let proposal_id = approved_proposal(&pool, &sup_token, &coord_token, 3).await;

    let response = create_request(&pool, &a_token, proposal_id, &[student_a.id, student_b.id]).await;
    let request_id = body_json(response).await["data"]["id"].as_i64().unwrap();
    let response = approve_request(&pool, &sup_token, request_id).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(
        app,
        &format!("/api/v1/groups/group/by-proposal/{proposal_id}"),
        &sup_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let members = json["data"]["members"].as_array().unwrap();
    assert_eq!(members.len(), 2, "both batch members must be in the group");
}

/// A non-owning supervisor cannot approve the request.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_approval_requires_owning_supervisor(pool: PgPool) {
    let (_owner, owner_token) = auth_user(&pool, "owner@uni.edu", "supervisor").await;
    let (_other, other_token) = auth_user(&pool, "other@uni.edu", "supervisor").await;
    let (_coordinator, coord_token) = auth_user(&pool, "coord@uni.edu", "coordinator").await;
    let (student_a, a_token) = auth_user(&pool, "ada@uni.edu", "student").await;

    let proposal_id = approved_proposal(&pool, &owner_token, &coord_token, 3).await;

    let response = create_request(&pool, &a_token, proposal_id, &[student_a.id]).await;
    let request_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = approve_request(&pool, &other_token, request_id).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Rejection is terminal: the request cannot be approved afterwards.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_reject_is_terminal(pool: PgPool) {
    let (_supervisor, sup_token) = auth_user(&pool, "sup@uni.edu", "supervisor").await;
    let (_coordinator, coord_token) = auth_user(&pool, "coord@uni.edu", "coordinator").await;
    let (student_a, a_token) = auth_user(&pool, "ada@uni.edu", "student").await;

    let proposal_id = approved_proposal(&pool, &sup_token, &coord_token, 3).await;

    let response = create_request(&pool, &a_token, proposal_id, &[student_a.id]).await;
    let request_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/proposals/join-requests/{request_id}/reject"),
        serde_json::json!({}),
        &sup_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "rejected");

    let response = approve_request(&pool, &sup_token, request_id).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(current_students(&pool, &sup_token, proposal_id).await, 0);
}

/// The supervisor list shows pending requests with proposal and students.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_for_supervisor(pool: PgPool) {
    let (_supervisor, sup_token) = auth_user(&pool, "sup@uni.edu", "supervisor").await;
    let (_coordinator, coord_token) = auth_user(&pool, "coord@uni.edu", "coordinator").await;
    let (student_a, a_token) = auth_user(&pool, "ada@uni.edu", "student").await;

    let proposal_id = approved_proposal(&pool, &sup_token, &coord_token, 3).await;
    let response = create_request(&pool, &a_token, proposal_id, &[student_a.id]).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/proposals/join-requests/supervisor", &sup_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let requests = json["data"].as_array().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["status"], "pending");
    assert_eq!(requests[0]["proposal"]["id"], proposal_id);
    assert_eq!(requests[0]["students"][0]["id"], student_a.id);
}
