//! API-token extractors for the mobile app and scanning devices.
//!
//! Devices authenticate with the opaque token issued by `/mobile/login` or
//! `/auth/device/login`, sent as `Authorization: Bearer <token>`. Only the
//! token's SHA-256 digest is stored, so lookup hashes the presented value.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use healthvitals_core::api_tokens::{extract_prefix, hash_api_token};
use healthvitals_core::error::CoreError;
use healthvitals_db::models::user::User;
use healthvitals_db::repositories::UserRepo;

use super::auth::bearer_token;
use crate::error::AppError;
use crate::state::AppState;

/// The active user owning the presented API token. Rejects with 401 when the
/// token is missing or unknown.
#[derive(Debug, Clone)]
pub struct DeviceUser(pub User);

/// Like [`DeviceUser`], but yields `None` for anonymous callers and for
/// tokens that match no user.
#[derive(Debug, Clone)]
pub struct OptionalDeviceUser(pub Option<User>);

async fn resolve(parts: &Parts, state: &AppState) -> Result<Option<User>, AppError> {
    let Some(token) = bearer_token(parts)? else {
        return Ok(None);
    };
    let user = UserRepo::find_by_api_token_hash(&state.pool, &hash_api_token(token)).await?;
    if user.is_none() {
        tracing::warn!(token_prefix = %extract_prefix(token), "Unknown API token");
    }
    Ok(user)
}

impl FromRequestParts<AppState> for DeviceUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve(parts, state)
            .await?
            .map(DeviceUser)
            .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Invalid API token".into())))
    }
}

impl FromRequestParts<AppState> for OptionalDeviceUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(OptionalDeviceUser(resolve(parts, state).await?))
    }
}
