//! Route definitions for the `/admin` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET /check       -> check_admin
/// GET /users       -> list_users
/// GET /vitals      -> list_vitals
/// GET /face-scans  -> list_face_scans
/// GET /stats       -> stats
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/check", get(admin::check_admin))
        .route("/users", get(admin::list_users))
        .route("/vitals", get(admin::list_vitals))
        .route("/face-scans", get(admin::list_face_scans))
        .route("/stats", get(admin::stats))
}
