//! Route definitions for the `/settings` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::settings;
use crate::state::AppState;

/// Routes mounted at `/settings`.
///
/// ```text
/// GET /         -> get_settings
/// PUT /         -> update_settings
/// GET /export   -> export_data
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route("/export", get(settings::export_data))
}
