#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use healthvitals_api::auth::jwt::JwtConfig;
use healthvitals_api::auth::password::hash_password;
use healthvitals_api::config::{PdfConfig, ServerConfig, UploadConfig};
use healthvitals_api::router::build_app_router;
use healthvitals_api::state::AppState;
use healthvitals_core::roles::ROLE_USER;
use healthvitals_db::models::patient::CreatePatient;
use healthvitals_db::models::user::{CreateUser, User};
use healthvitals_db::repositories::{PatientRepo, UserRepo};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "test_password_123!";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: String::new(),
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        pdf: PdfConfig {
            renderer_bin: "/nonexistent/chromium".to_string(),
            timeout_secs: 5,
        },
        uploads: UploadConfig {
            dir: std::env::temp_dir().join("healthvitals-test-uploads"),
            max_bytes: 64 * 1024,
        },
    }
}

/// Build the full application router (same middleware stack as `main.rs`)
/// over the given pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`] and the given role.
pub async fn create_user(pool: &PgPool, email: &str, role: &str) -> User {
    let password_hash = hash_password(TEST_PASSWORD).expect("hashing should succeed");
    UserRepo::create(
        pool,
        &CreateUser {
            email: email.to_string(),
            password_hash,
            name: Some("Test User".to_string()),
            role: role.to_string(),
        },
    )
    .await
    .expect("user creation should succeed")
}

/// Insert a `user` account with a primary patient (170 cm / 70 kg).
pub async fn create_user_with_patient(pool: &PgPool, email: &str) -> User {
    let user = create_user(pool, email, ROLE_USER).await;
    PatientRepo::create(
        pool,
        &CreatePatient {
            user_id: user.id,
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            height: Some(170.0),
            weight: Some(70.0),
            ..Default::default()
        },
    )
    .await
    .expect("patient creation should succeed");
    user
}

/// Log in through the API and return the access token.
pub async fn login(pool: &PgPool, email: &str) -> String {
    let body = serde_json::json!({ "email": email, "password": TEST_PASSWORD });
    let response = post_json(build_test_app(pool.clone()), "/api/auth/login", body).await;
    assert_eq!(response.status(), 200, "login should succeed");
    let json = body_json(response).await;
    json["data"]["access_token"]
        .as_str()
        .expect("access_token")
        .to_string()
}

/// Log in through the mobile endpoint and return the API token.
pub async fn mobile_login(pool: &PgPool, email: &str) -> String {
    let body = serde_json::json!({ "email": email, "password": TEST_PASSWORD });
    let response = post_json(build_test_app(pool.clone()), "/api/mobile/login", body).await;
    assert_eq!(response.status(), 200, "mobile login should succeed");
    let json = body_json(response).await;
    json["data"]["api_token"]
        .as_str()
        .expect("api_token")
        .to_string()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("request should complete")
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, request(Method::GET, uri, None, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request(Method::GET, uri, Some(token), None)).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, request(Method::POST, uri, None, Some(body))).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, request(Method::POST, uri, Some(token), Some(body))).await
}

/// POST a `multipart/form-data` body of `(name, filename, bytes)` parts.
/// Parts without a filename are plain text fields.
pub async fn post_multipart_auth(
    app: Router,
    uri: &str,
    parts: &[(&str, Option<&str>, &[u8])],
    token: &str,
) -> Response<Body> {
    const BOUNDARY: &str = "healthvitals-test-boundary";
    let mut body = Vec::new();
    for (name, filename, bytes) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, request(Method::PUT, uri, Some(token), Some(body))).await
}

/// Collect a response body as raw text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_str(&body_text(response).await).expect("body should be JSON")
}
