//! Route definitions for the `/health-vitals` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::health_vitals;
use crate::state::AppState;

/// Routes mounted at `/health-vitals`. All require a session.
///
/// ```text
/// GET  /            -> list_vitals
/// POST /            -> create_vitals
/// GET  /latest      -> latest_vitals
/// GET  /analytics   -> vitals_analytics
/// GET  /report      -> vitals_report
/// GET  /{id}/ecg    -> vitals_ecg
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(health_vitals::list_vitals).post(health_vitals::create_vitals),
        )
        .route("/latest", get(health_vitals::latest_vitals))
        .route("/analytics", get(health_vitals::vitals_analytics))
        .route("/report", get(health_vitals::vitals_report))
        .route("/{id}/ecg", get(health_vitals::vitals_ecg))
}
