#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use cpms_api::auth::jwt::JwtConfig;
use cpms_api::auth::password::hash_password;
use cpms_api::config::ServerConfig;
use cpms_api::email::{MailConfig, Mailer};
use cpms_api::router::build_app_router;
use cpms_api::state::AppState;
use cpms_db::models::user::{CreateUser, User};
use cpms_db::repositories::{RoleRepo, UserRepo};

/// Build a test `ServerConfig` with safe defaults: a fixed JWT secret,
/// mail delivery disabled, and the dev CORS origin.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret-not-for-production".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        mail: MailConfig {
            sendgrid_api_key: None,
            from_address: "noreply@cpms.local".to_string(),
        },
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        mailer: Arc::new(Mailer::new(config.mail.clone())),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
    token: Option<&str>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .expect("request should build"),
        None => builder.body(Body::empty()).expect("request should build"),
    };
    app.oneshot(request).await.expect("request should succeed")
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, "GET", uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, "GET", uri, None, Some(token)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, "POST", uri, Some(body), None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, "POST", uri, Some(body), Some(token)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response {
    send(app, "PUT", uri, Some(body), Some(token)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, "DELETE", uri, None, Some(token)).await
}

/// Parse a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

// ---------------------------------------------------------------------------
// Seeding helpers
// ---------------------------------------------------------------------------

/// Create a test user with the given role directly in the database,
/// returning the user row plus the plaintext password used.
pub async fn create_test_user(pool: &PgPool, email: &str, role_name: &str) -> (User, String) {
    let password = "test_password_123!";
    let hashed = hash_password(password).expect("hashing should succeed");
    let role = RoleRepo::find_by_name(pool, role_name)
        .await
        .expect("role lookup should succeed")
        .expect("seeded role should exist");
    let input = CreateUser {
        email: email.to_string(),
        first_name: "Test".to_string(),
        last_name: email.split('@').next().unwrap_or("User").to_string(),
        password_hash: hashed,
        role_id: role.id,
    };
    let user = UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed");
    (user, password.to_string())
}

/// Log a user in via the API and return their access token.
pub async fn login_token(pool: &PgPool, email: &str, password: &str) -> String {
    let app = build_test_app(pool.clone());
    let body = serde_json::json!({ "email": email, "password": password });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK, "login should succeed");
    let json = body_json(response).await;
    json["data"]["access_token"]
        .as_str()
        .expect("login response should contain access_token")
        .to_string()
}

/// Create a user with the given role and log them in. Returns the user
/// row and a valid access token.
pub async fn auth_user(pool: &PgPool, email: &str, role_name: &str) -> (User, String) {
    let (user, password) = create_test_user(pool, email, role_name).await;
    let token = login_token(pool, email, &password).await;
    (user, token)
}
