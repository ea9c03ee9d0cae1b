//! Route definitions for the `/profile` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::profile;
use crate::state::AppState;

/// Routes mounted at `/profile`.
///
/// ```text
/// GET  /        -> get_profile
/// PUT  /        -> update_profile
/// POST /upload  -> upload_image (multipart)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(profile::get_profile).put(profile::update_profile))
        .route("/upload", post(profile::upload_image))
}
