//! HTTP-level integration tests for the dashboard overview, the `/api/user`
//! account views and profile image uploads.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{
    body_json, create_user, create_user_with_patient, get, get_auth, login,
    post_multipart_auth, put_json_auth,
};
use healthvitals_core::roles::{ROLE_ADMIN, ROLE_USER};
use healthvitals_core::vitals::{SOURCE_DEVICE, SOURCE_WEB};
use healthvitals_db::models::user::User;
use healthvitals_db::models::vitals::{CreateVitals, VitalsReading};
use healthvitals_db::repositories::{PatientRepo, VitalsRepo};
use http_body_util::BodyExt;
use serde_json::json;
use sqlx::PgPool;

/// File a reading for `user`'s primary patient, `days_ago` days back.
async fn seed_vitals(pool: &PgPool, user: &User, days_ago: i64, reading: VitalsReading, source: &str) {
    let patient = PatientRepo::find_primary_for_user(pool, user.id)
        .await
        .unwrap()
        .unwrap();
    VitalsRepo::create(
        pool,
        &CreateVitals {
            patient_id: Some(patient.id),
            user_id: Some(user.id),
            source: source.to_string(),
            recorded_at: Some(Utc::now() - Duration::days(days_ago)),
            reading,
            ..Default::default()
        },
    )
    .await
    .unwrap();
}

fn heart_rate(hr: i32) -> VitalsReading {
    VitalsReading {
        heart_rate: Some(hr),
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dashboard_requires_session(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/analytics").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dashboard_overview_is_scoped_to_caller(pool: PgPool) {
    let owner = create_user_with_patient(&pool, "owner@example.com").await;
    let other = create_user_with_patient(&pool, "other@example.com").await;

    let today = VitalsReading {
        heart_rate: Some(70),
        blood_pressure_systolic: Some(120),
        blood_pressure_diastolic: Some(80),
        diabetic_risk: Some("High".to_string()),
        ..Default::default()
    };
    seed_vitals(&pool, &owner, 0, today, SOURCE_WEB).await;
    seed_vitals(&pool, &owner, 3, heart_rate(80), SOURCE_WEB).await;
    let older = VitalsReading {
        hypertension_risk: Some("low".to_string()),
        ..heart_rate(90)
    };
    seed_vitals(&pool, &owner, 10, older, SOURCE_DEVICE).await;
    seed_vitals(&pool, &other, 0, heart_rate(120), SOURCE_WEB).await;

    let token = login(&pool, "owner@example.com").await;
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/analytics", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let data = &json["data"];

    assert_eq!(data["totals"]["users"], 1);
    assert_eq!(data["totals"]["patients"], 1);
    assert_eq!(data["totals"]["vitals"], 3);
    assert_eq!(data["totals"]["face_scans"], 0);

    assert_eq!(data["vitals_timeline"]["today"], 1);
    assert_eq!(data["vitals_timeline"]["this_week"], 2);
    assert_eq!(data["vitals_timeline"]["this_month"], 3);
    assert_eq!(data["vitals_timeline"]["weekly_trend"], 100.0);

    assert_eq!(data["averages"]["heart_rate"], 80);
    assert_eq!(data["averages"]["blood_pressure"], "120/80");
    assert!(data["averages"]["oxygen_saturation"].is_null());

    assert_eq!(data["risk_assessment"]["diabetic"]["high"], 1);
    assert_eq!(data["risk_assessment"]["hypertension"]["low"], 1);
    assert_eq!(data["sources"]["web"], 2);
    assert_eq!(data["sources"]["device"], 1);

    assert_eq!(data["latest"]["heart_rate"], 70);
    assert_eq!(data["latest"]["patient_name"], "Test User");
    assert!(data["health_score"].as_u64().unwrap() <= 100);
    assert_eq!(data["user_role"], ROLE_USER);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dashboard_overview_for_admin_covers_everyone(pool: PgPool) {
    let owner = create_user_with_patient(&pool, "owner@example.com").await;
    let other = create_user_with_patient(&pool, "other@example.com").await;
    create_user(&pool, "admin@example.com", ROLE_ADMIN).await;
    seed_vitals(&pool, &owner, 1, heart_rate(70), SOURCE_WEB).await;
    seed_vitals(&pool, &other, 2, heart_rate(72), SOURCE_WEB).await;

    let token = login(&pool, "admin@example.com").await;
    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/analytics", &token).await).await;
    let data = &json["data"];

    assert_eq!(data["totals"]["users"], 3);
    assert_eq!(data["totals"]["patients"], 2);
    assert_eq!(data["totals"]["vitals"], 2);
    assert_eq!(data["user_role"], ROLE_ADMIN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dashboard_without_readings(pool: PgPool) {
    create_user_with_patient(&pool, "fresh@example.com").await;
    let token = login(&pool, "fresh@example.com").await;

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/analytics", &token).await).await;
    let data = &json["data"];
    assert_eq!(data["totals"]["vitals"], 0);
    assert_eq!(data["vitals_timeline"]["weekly_trend"], 0.0);
    assert!(data["latest"].is_null());
    assert!(data["averages"]["heart_rate"].is_null());
    assert_eq!(data["health_score"], 0);
}

// ---------------------------------------------------------------------------
// /user/profile
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_account_profile_includes_primary_patient(pool: PgPool) {
    let user = create_user_with_patient(&pool, "me@example.com").await;
    let token = login(&pool, "me@example.com").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/user/profile", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["id"], user.id);
    assert_eq!(data["email"], "me@example.com");
    assert_eq!(data["patient"]["first_name"], "Test");
    assert!(data.get("password_hash").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_account_update_keeps_omitted_patient_fields(pool: PgPool) {
    create_user_with_patient(&pool, "me@example.com").await;
    let token = login(&pool, "me@example.com").await;

    let body = json!({
        "name": "Ada Lovelace",
        "blood_type": "O+",
        "allergies": "Penicillin",
        "phone_number": "+44 20 7946 0000"
    });
    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(app, "/api/user/profile", body, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["name"], "Ada Lovelace");
    assert_eq!(data["patient"]["blood_type"], "O+");
    assert_eq!(data["patient"]["allergies"], "Penicillin");
    assert_eq!(data["patient"]["first_name"], "Test");
    assert_eq!(data["patient"]["height"], 170.0);

    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/user/profile", &token).await).await;
    let data = &json["data"];
    assert_eq!(data["patient"]["phone_number"], "+44 20 7946 0000");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_account_update_creates_patient_only_when_complete(pool: PgPool) {
    create_user(&pool, "new@example.com", ROLE_USER).await;
    let token = login(&pool, "new@example.com").await;

    let app = common::build_test_app(pool.clone());
    let partial = json!({ "first_name": "Grace" });
    let json = body_json(put_json_auth(app, "/api/user/profile", partial, &token).await).await;
    let data = &json["data"];
    assert!(data["patient"].is_null());

    let full = json!({
        "first_name": "Grace",
        "last_name": "Hopper",
        "date_of_birth": "1906-12-09",
        "gender": "Female",
        "medications": "None"
    });
    let app = common::build_test_app(pool);
    let response = put_json_auth(app, "/api/user/profile", full, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["patient"]["last_name"], "Hopper");
    assert_eq!(data["patient"]["date_of_birth"], "1906-12-09");
    assert_eq!(data["patient"]["medications"], "None");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_account_update_rejects_unknown_blood_type(pool: PgPool) {
    create_user_with_patient(&pool, "me@example.com").await;
    let token = login(&pool, "me@example.com").await;

    let app = common::build_test_app(pool);
    let body = json!({ "blood_type": "C+", "name": "x" });
    let response = put_json_auth(app, "/api/user/profile", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// /user/vitals
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_vitals_feed_hides_other_accounts(pool: PgPool) {
    let owner = create_user_with_patient(&pool, "owner@example.com").await;
    let other = create_user_with_patient(&pool, "other@example.com").await;
    create_user(&pool, "admin@example.com", ROLE_ADMIN).await;
    seed_vitals(&pool, &owner, 2, heart_rate(70), SOURCE_WEB).await;
    seed_vitals(&pool, &owner, 1, heart_rate(75), SOURCE_WEB).await;
    seed_vitals(&pool, &other, 1, heart_rate(99), SOURCE_WEB).await;

    let token = login(&pool, "owner@example.com").await;
    let app = common::build_test_app(pool.clone());
    let json = body_json(get_auth(app, "/api/user/vitals", &token).await).await;
    let vitals = json["data"].as_array().unwrap();
    assert_eq!(vitals.len(), 2);
    assert_eq!(vitals[0]["heart_rate"], 75);
    assert!(vitals.iter().all(|v| v["user_id"] == owner.id));
    assert_eq!(vitals[0]["owner_email"], "owner@example.com");

    let admin_token = login(&pool, "admin@example.com").await;
    let app = common::build_test_app(pool);
    let json = body_json(get_auth(app, "/api/user/vitals", &admin_token).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 3);
}

// ---------------------------------------------------------------------------
// /profile/upload
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_profile_picture_upload_is_stored_and_served(pool: PgPool) {
    let user = create_user_with_patient(&pool, "pic@example.com").await;
    let token = login(&pool, "pic@example.com").await;
    let image: &[u8] = b"\x89PNG\r\n\x1a\nnot really a png";

    let app = common::build_test_app(pool.clone());
    let parts = [("type", None, b"profile".as_slice()), ("file", Some("Me.PNG"), image)];
    let response = post_multipart_auth(app, "/api/profile/upload", &parts, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let data = &json["data"];
    let url = data["url"].as_str().unwrap().to_string();
    assert!(url.starts_with(&format!("/uploads/profiles/{}_profile_", user.id)));
    assert!(url.ends_with(".png"));
    assert_eq!(data["profile"]["profile_picture"], url.as_str());
    assert!(data["profile"]["cover_image"].is_null());

    let app = common::build_test_app(pool);
    let served = get(app, &url).await;
    assert_eq!(served.status(), StatusCode::OK);
    let bytes = served.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes.as_ref(), image);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upload_without_profile_type_sets_cover(pool: PgPool) {
    create_user_with_patient(&pool, "cover@example.com").await;
    let token = login(&pool, "cover@example.com").await;

    let app = common::build_test_app(pool);
    let parts = [("file", Some("banner.jpg"), b"jpeg-bytes".as_slice())];
    let response = post_multipart_auth(app, "/api/profile/upload", &parts, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let data = &json["data"];
    assert!(data["url"].as_str().unwrap().contains("_cover_"));
    assert_eq!(data["profile"]["cover_image"], data["url"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upload_rejects_missing_or_unsafe_files(pool: PgPool) {
    create_user_with_patient(&pool, "bad@example.com").await;
    let token = login(&pool, "bad@example.com").await;

    let cases: [&[(&str, Option<&str>, &[u8])]; 4] = [
        &[("type", None, b"profile")],
        &[("file", Some("page.html"), b"<script></script>")],
        &[("file", Some("empty.png"), b"")],
        &[("file", Some("huge.png"), &[0u8; 64 * 1024 + 1])],
    ];
    for parts in cases {
        let app = common::build_test_app(pool.clone());
        let response = post_multipart_auth(app, "/api/profile/upload", parts, &token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
