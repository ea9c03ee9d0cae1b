pub mod admin;
pub mod auth;
pub mod device;
pub mod health;
pub mod health_vitals;
pub mod mobile;
pub mod profile;
pub mod settings;
pub mod user;

use axum::routing::get;
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                       register (public)
/// /auth/login                          login (public)
/// /auth/refresh                        refresh (public)
/// /auth/logout                         logout (requires auth)
/// /auth/device/login                   device pairing (public)
///
/// /health-vitals                       list, create (requires auth)
/// /health-vitals/latest                latest reading with changes
/// /health-vitals/analytics             period analytics
/// /health-vitals/report                html / pdf / csv report
/// /health-vitals/{id}/ecg              synthesised ECG trace
///
/// /analytics                           dashboard overview (requires auth)
///
/// /profile                             get, upsert (requires auth)
/// /profile/upload                      profile / cover image (multipart)
/// /user/profile                        account with patient, partial update
/// /user/vitals                         newest vitals with owners
/// /settings                            get, update (requires auth)
/// /settings/export                     account export
///
/// /admin/check                         role check (admin only)
/// /admin/users                         all users
/// /admin/vitals                        latest vitals with owners
/// /admin/face-scans                    latest face scans with owners
/// /admin/stats                         aggregate counts
///
/// /mobile/login                        issue API token (public)
/// /mobile/scan                         submit scan (API token optional)
/// /mobile/results                      scan results (API token)
/// /mobile/report                       scan PDF report (API token)
///
/// /device/vitals                       record, list (API token)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Session authentication and device pairing.
        .nest("/auth", auth::router())
        // Vitals history, analytics and reports.
        .nest("/health-vitals", health_vitals::router())
        // Dashboard overview, scoped by role.
        .route("/analytics", get(dashboard::overview))
        // Per-user profile and preferences.
        .nest("/profile", profile::router())
        .nest("/user", user::router())
        .nest("/settings", settings::router())
        // Admin dashboard.
        .nest("/admin", admin::router())
        // Scanning app and devices (API token auth).
        .nest("/mobile", mobile::router())
        .nest("/device", device::router())
}
