//! Route definitions for the `/user` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// Routes mounted at `/user`.
///
/// ```text
/// GET /profile  -> get_account
/// PUT /profile  -> update_account
/// GET /vitals   -> list_vitals
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(user::get_account).put(user::update_account))
        .route("/vitals", get(user::list_vitals))
}
