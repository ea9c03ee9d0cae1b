//! Route definitions for the `/mobile` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::mobile;
use crate::state::AppState;

/// Routes mounted at `/mobile`.
///
/// ```text
/// POST /login    -> login
/// POST /scan     -> submit_scan (API token optional)
/// GET  /results  -> results (API token)
/// POST /report   -> report (API token)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(mobile::login))
        .route("/scan", post(mobile::submit_scan))
        .route("/results", get(mobile::results))
        .route("/report", post(mobile::report))
}
