//! HTTP-level integration tests for the `/api/profile` and `/api/settings`
//! endpoints, including the account export.

mod common;

use axum::http::StatusCode;
use common::{body_json, body_text, create_user_with_patient, get_auth, login, post_json_auth, put_json_auth};
use healthvitals_db::repositories::SettingsRepo;
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_profile_created_on_first_read(pool: PgPool) {
    create_user_with_patient(&pool, "profile@example.com").await;
    let token = login(&pool, "profile@example.com").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/profile", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["id"].is_number());
    assert!(json["data"]["first_name"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_profile_update(pool: PgPool) {
    create_user_with_patient(&pool, "edit@example.com").await;
    let token = login(&pool, "edit@example.com").await;

    let app = common::build_test_app(pool.clone());
    let body = json!({ "first_name": "Grace", "city": "Arlington", "height": 168.0 });
    let response = put_json_auth(app, "/api/profile", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/profile", &token).await).await;
    assert_eq!(json["data"]["first_name"], "Grace");
    assert_eq!(json["data"]["city"], "Arlington");
    assert_eq!(json["data"]["height"], 168.0);
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_settings_defaults(pool: PgPool) {
    create_user_with_patient(&pool, "defaults@example.com").await;
    let token = login(&pool, "defaults@example.com").await;

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/settings", &token).await).await;
    assert_eq!(json["data"]["theme"], "light");
    assert_eq!(json["data"]["unit_system"], "metric");
    assert_eq!(json["data"]["export_format"], "json");
    assert_eq!(json["data"]["email_notifications"], true);
    assert_eq!(json["data"]["sms_notifications"], false);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_settings_partial_update_keeps_other_fields(pool: PgPool) {
    create_user_with_patient(&pool, "partial@example.com").await;
    let token = login(&pool, "partial@example.com").await;

    let app = common::build_test_app(pool.clone());
    let body = json!({ "theme": "dark", "unit_system": "imperial" });
    let response = put_json_auth(app, "/api/settings", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let body = json!({ "sms_notifications": true });
    let response = put_json_auth(app, "/api/settings", body, &token).await;
    let json = body_json(response).await;

    assert_eq!(json["data"]["theme"], "dark");
    assert_eq!(json["data"]["unit_system"], "imperial");
    assert_eq!(json["data"]["sms_notifications"], true);
    assert_eq!(json["data"]["language"], "en");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_settings_reject_unknown_values(pool: PgPool) {
    create_user_with_patient(&pool, "invalid@example.com").await;
    let token = login(&pool, "invalid@example.com").await;

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(app, "/api/settings", json!({ "unit_system": "cubits" }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool);
    let response = put_json_auth(app, "/api/settings", json!({ "export_format": "xml" }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_json_export_contains_everything(pool: PgPool) {
    let user = create_user_with_patient(&pool, "export@example.com").await;
    let token = login(&pool, "export@example.com").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/health-vitals", json!({ "heart_rate": 68 }), &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/settings/export", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/json");
    let disposition = response.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"user-data-"));
    assert!(disposition.ends_with(".json\""));

    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["user"]["email"], "export@example.com");
    assert!(body["user"].get("password_hash").is_none());
    assert_eq!(body["patients"].as_array().unwrap().len(), 1);
    assert_eq!(body["vitals"][0]["heart_rate"], 68);

    let settings = SettingsRepo::get_or_create(&pool, user.id).await.unwrap();
    assert!(settings.last_export_at.is_some(), "export should be stamped");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_csv_export_has_row_per_reading(pool: PgPool) {
    create_user_with_patient(&pool, "csvexport@example.com").await;
    let token = login(&pool, "csvexport@example.com").await;

    for hr in [61, 62] {
        let app = common::build_test_app(pool.clone());
        let response = post_json_auth(app, "/api/health-vitals", json!({ "heart_rate": hr }), &token).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/settings/export?format=csv", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/csv; charset=utf-8");

    let csv = body_text(response).await;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("vitals.heart_rate"));
    assert!(lines[1..].iter().all(|l| l.contains("csvexport@example.com")));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_export_rejects_unknown_format(pool: PgPool) {
    create_user_with_patient(&pool, "badexport@example.com").await;
    let token = login(&pool, "badexport@example.com").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/settings/export?format=xml", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
