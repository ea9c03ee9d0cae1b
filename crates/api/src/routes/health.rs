//! Liveness probe for load balancers and the mobile app's connectivity check.
//!
//! Mounted at the root, outside `/api`, and never requires auth.

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use chrono::Utc;
use healthvitals_core::types::Timestamp;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when the database answered, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Round trip of the `SELECT 1`, absent when it failed.
    pub db_latency_ms: Option<u64>,
    pub checked_at: Timestamp,
}

/// Status code and label for a given database state. Degraded is a 503 so
/// load balancers stop routing to an instance that cannot read vitals.
fn classify(db_healthy: bool) -> (StatusCode, &'static str) {
    if db_healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    }
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let started = Instant::now();
    let result = healthvitals_db::health_check(&state.pool).await;
    let db_latency_ms = match &result {
        Ok(()) => Some(started.elapsed().as_millis() as u64),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            None
        }
    };
    let (code, status) = classify(result.is_ok());

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            db_healthy: result.is_ok(),
            db_latency_ms,
            checked_at: Utc::now(),
        }),
    )
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
