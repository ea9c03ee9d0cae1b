//! Route definitions for the `/device` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::device;
use crate::state::AppState;

/// Routes mounted at `/device`. All require an API token.
///
/// ```text
/// GET  /vitals  -> list_vitals
/// POST /vitals  -> record_vitals
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/vitals",
        get(device::list_vitals).post(device::record_vitals),
    )
}
