//! HTTP-level integration tests for the `/api/admin` endpoints and role
//! enforcement.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_user, create_user_with_patient, get, get_auth, login, mobile_login,
    post_json_auth,
};
use healthvitals_core::roles::{ROLE_ADMIN, ROLE_DEVICE};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_routes_require_session(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/admin/users").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_routes_forbid_regular_users(pool: PgPool) {
    create_user_with_patient(&pool, "plain@example.com").await;
    let token = login(&pool, "plain@example.com").await;

    for uri in [
        "/api/admin/check",
        "/api/admin/users",
        "/api/admin/vitals",
        "/api/admin/face-scans",
        "/api/admin/stats",
    ] {
        let app = common::build_test_app(pool.clone());
        let response = get_auth(app, uri, &token).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_check(pool: PgPool) {
    let admin = create_user(&pool, "admin@example.com", ROLE_ADMIN).await;
    let token = login(&pool, "admin@example.com").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/admin/check", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["is_admin"], true);
    assert_eq!(json["data"]["user_id"], admin.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_lists_users_without_secrets(pool: PgPool) {
    create_user(&pool, "admin@example.com", ROLE_ADMIN).await;
    create_user_with_patient(&pool, "someone@example.com").await;
    let token = login(&pool, "admin@example.com").await;

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/admin/users", &token).await).await;
    let users = json["data"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    for user in users {
        assert!(user.get("password_hash").is_none());
        assert!(user.get("api_token_hash").is_none());
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_vitals_include_owner(pool: PgPool) {
    create_user(&pool, "admin@example.com", ROLE_ADMIN).await;
    create_user_with_patient(&pool, "owner@example.com").await;
    let admin_token = login(&pool, "admin@example.com").await;
    let owner_token = login(&pool, "owner@example.com").await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "heart_rate": 71 });
    let response = post_json_auth(app, "/api/health-vitals", body, &owner_token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/admin/vitals", &admin_token).await).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["heart_rate"], 71);
    assert_eq!(rows[0]["owner_email"], "owner@example.com");
    assert_eq!(rows[0]["patient_first_name"], "Test");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_face_scans_include_owner(pool: PgPool) {
    create_user(&pool, "admin@example.com", ROLE_ADMIN).await;
    create_user_with_patient(&pool, "scanner@example.com").await;
    let admin_token = login(&pool, "admin@example.com").await;
    let api_token = mobile_login(&pool, "scanner@example.com").await;

    let app = common::build_test_app(pool.clone());
    let body = serde_json::json!({ "heart_rate": 66, "scan_confidence": 0.8 });
    let response = post_json_auth(app, "/api/mobile/scan", body, &api_token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/admin/face-scans", &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let scans = json["data"].as_array().unwrap();
    assert_eq!(scans.len(), 1);
    assert_eq!(scans[0]["owner_email"], "scanner@example.com");
    assert_eq!(scans[0]["confidence"], 0.8);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_stats_counts(pool: PgPool) {
    create_user(&pool, "admin@example.com", ROLE_ADMIN).await;
    create_user(&pool, "device@example.com", ROLE_DEVICE).await;
    create_user_with_patient(&pool, "user@example.com").await;
    let token = login(&pool, "admin@example.com").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/admin/stats", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["data"]["total_users"], 3);
    assert_eq!(json["data"]["device_users"], 1);
    assert_eq!(json["data"]["total_vitals"], 0);
    assert_eq!(json["data"]["total_face_scans"], 0);
}
