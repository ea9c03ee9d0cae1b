//! HTTP-level integration tests for the `/api/health-vitals` endpoints.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{body_json, body_text, create_user, create_user_with_patient, get, get_auth, login, post_json_auth};
use healthvitals_core::roles::ROLE_USER;
use serde_json::{json, Value};
use sqlx::PgPool;

/// POST one reading and return the created record.
async fn record(pool: &PgPool, token: &str, body: Value) -> Value {
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/health-vitals", body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_vitals_require_session(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/health-vitals").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_vitals_derives_bmi(pool: PgPool) {
    create_user_with_patient(&pool, "bmi@example.com").await;
    let token = login(&pool, "bmi@example.com").await;

    let created = record(
        &pool,
        &token,
        json!({ "blood_pressure_systolic": 118, "blood_pressure_diastolic": 76, "heart_rate": 64 }),
    )
    .await;

    assert_eq!(created["source"], "web");
    assert_eq!(created["heart_rate"], 64);
    // 70 kg / 1.70 m squared
    let bmi = created["bmi"].as_f64().expect("bmi should be derived");
    assert!((bmi - 24.22).abs() < 0.01, "unexpected bmi {bmi}");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_vitals_rejects_out_of_range(pool: PgPool) {
    create_user_with_patient(&pool, "range@example.com").await;
    let token = login(&pool, "range@example.com").await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(app, "/api/health-vitals", json!({ "heart_rate": 400 }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_vitals_without_patient_is_404(pool: PgPool) {
    create_user(&pool, "nopatient@example.com", ROLE_USER).await;
    let token = login(&pool, "nopatient@example.com").await;

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/health-vitals", json!({ "heart_rate": 70 }), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Reads degrade to empty results instead.
    let app = common::build_test_app(pool.clone());
    let json = body_json(get_auth(app, "/api/health-vitals", &token).await).await;
    assert_eq!(json["data"], json!([]));
    assert_eq!(json["pagination"]["total"], 0);

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/health-vitals/latest", &token).await).await;
    assert!(json["data"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_vitals_is_paged_newest_first(pool: PgPool) {
    create_user_with_patient(&pool, "paged@example.com").await;
    let token = login(&pool, "paged@example.com").await;

    let now = Utc::now();
    for (days_ago, hr) in [(3, 61), (2, 62), (1, 63)] {
        let at = now - Duration::days(days_ago);
        record(&pool, &token, json!({ "heart_rate": hr, "recorded_at": at })).await;
    }

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/health-vitals?page=1&limit=2", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["heart_rate"], 63);
    assert_eq!(items[1]["heart_rate"], 62);
    assert_eq!(json["pagination"]["total"], 3);
    assert_eq!(json["pagination"]["total_pages"], 2);

    // The end date is inclusive of the whole day.
    let end = (now - Duration::days(2)).format("%Y-%m-%d");
    let app = common::build_test_app(pool);
    let uri = format!("/api/health-vitals?end_date={end}");
    let json = body_json(get_auth(app, &uri, &token).await).await;
    assert_eq!(json["pagination"]["total"], 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_vitals_rejects_bad_date(pool: PgPool) {
    create_user_with_patient(&pool, "baddate@example.com").await;
    let token = login(&pool, "baddate@example.com").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/health-vitals?start_date=yesterday", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_latest_vitals_compares_with_previous(pool: PgPool) {
    create_user_with_patient(&pool, "latest@example.com").await;
    let token = login(&pool, "latest@example.com").await;

    let earlier = Utc::now() - Duration::hours(2);
    record(&pool, &token, json!({ "heart_rate": 60, "recorded_at": earlier })).await;
    record(&pool, &token, json!({ "heart_rate": 66 })).await;

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/health-vitals/latest", &token).await).await;
    let data = &json["data"];

    assert_eq!(data["current"]["heart_rate"], 66);
    assert_eq!(data["previous"]["heart_rate"], 60);
    assert!(data["changes"]["heart_rate"].is_object());
    assert_eq!(data["patient"]["name"], "Test User");
    assert!(data["health_score"].as_u64().unwrap() <= 100);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_analytics_summarizes_period(pool: PgPool) {
    create_user_with_patient(&pool, "analytics@example.com").await;
    let token = login(&pool, "analytics@example.com").await;

    record(&pool, &token, json!({ "heart_rate": 60, "recorded_at": Utc::now() - Duration::days(1) })).await;
    record(&pool, &token, json!({ "heart_rate": 80 })).await;
    // Outside the 7 day window.
    record(&pool, &token, json!({ "heart_rate": 120, "recorded_at": Utc::now() - Duration::days(20) })).await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/health-vitals/analytics?period=7d", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["data"]["period"], "7d");
    assert_eq!(json["data"]["total_records"], 2);
    assert_eq!(json["data"]["summary"]["heart_rate"]["average"], 70.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_ecg_is_deterministic_per_seed(pool: PgPool) {
    create_user_with_patient(&pool, "ecg@example.com").await;
    let token = login(&pool, "ecg@example.com").await;
    let created = record(&pool, &token, json!({ "heart_rate": 72 })).await;
    let id = created["id"].as_i64().unwrap();

    let uri = format!("/api/health-vitals/{id}/ecg?lead=II&duration=2&seed=42");
    let first = body_json(get_auth(common::build_test_app(pool.clone()), &uri, &token).await).await;
    let second = body_json(get_auth(common::build_test_app(pool.clone()), &uri, &token).await).await;

    assert_eq!(first["data"]["vitals_id"], id);
    assert_eq!(first["data"]["samples"].as_array().unwrap().len(), 2 * 500);
    assert_eq!(first["data"]["samples"], second["data"]["samples"]);
    assert!(first["data"]["svg_path"].as_str().unwrap().starts_with('M'));

    let uri = format!("/api/health-vitals/{id}/ecg?duration=0");
    let response = get_auth(common::build_test_app(pool), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Another account's reading is invisible.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_ecg_for_foreign_reading_is_404(pool: PgPool) {
    create_user_with_patient(&pool, "owner@example.com").await;
    create_user_with_patient(&pool, "other@example.com").await;
    let owner = login(&pool, "owner@example.com").await;
    let other = login(&pool, "other@example.com").await;

    let created = record(&pool, &owner, json!({ "heart_rate": 72 })).await;
    let uri = format!("/api/health-vitals/{}/ecg", created["id"]);

    let response = get_auth(common::build_test_app(pool), &uri, &other).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_csv_report_has_one_row_per_reading(pool: PgPool) {
    create_user_with_patient(&pool, "csv@example.com").await;
    let token = login(&pool, "csv@example.com").await;
    record(&pool, &token, json!({ "blood_pressure_systolic": 120, "blood_pressure_diastolic": 80 })).await;
    record(&pool, &token, json!({ "heart_rate": 70, "notes": "after run, tired" })).await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/health-vitals/report?format=csv", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/csv; charset=utf-8");
    let disposition = response.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=\"health-vitals-"));

    let csv = body_text(response).await;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains("120/80"));
    assert!(lines[2].contains("\"after run, tired\""));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_html_report_is_default(pool: PgPool) {
    create_user_with_patient(&pool, "html@example.com").await;
    let token = login(&pool, "html@example.com").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/health-vitals/report?period=90d", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/html; charset=utf-8");
    let html = body_text(response).await;
    assert!(html.contains("90d"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_report_rejects_unknown_format(pool: PgPool) {
    create_user_with_patient(&pool, "fmt@example.com").await;
    let token = login(&pool, "fmt@example.com").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/health-vitals/report?format=docx", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("docx"));
}
