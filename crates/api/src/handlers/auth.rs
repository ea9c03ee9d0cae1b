//! Handlers for the `/auth` resource (register, login, refresh, logout,
//! device pairing).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use healthvitals_core::api_tokens::generate_api_token;
use healthvitals_core::error::CoreError;
use healthvitals_core::roles::ROLE_USER;
use healthvitals_core::types::DbId;
use healthvitals_db::models::patient::{CreatePatient, Patient};
use healthvitals_db::models::profile::UserProfile;
use healthvitals_db::models::session::CreateSession;
use healthvitals_db::models::user::{CreateUser, User, UserResponse};
use healthvitals_db::repositories::user_repo::PUBLIC_DEVICE_EMAIL;
use healthvitals_db::repositories::{
    PatientRepo, ProfileRepo, SessionRepo, SettingsRepo, UserRepo,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{
    hash_password, validate_password_strength, verify_password, MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
}

/// Request body for `POST /auth/login` and `POST /mobile/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Request body for `POST /auth/device/login`. All fields are required; they
/// are optional here so a missing one yields a 400 rather than a 422.
#[derive(Debug, Deserialize)]
pub struct DeviceLoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub device_id: Option<String>,
}

/// Successful authentication response returned by register, login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct DeviceLoginResponse {
    pub user: DeviceLoginUser,
    /// Shown once; only its hash is stored.
    pub api_token: String,
}

#[derive(Debug, Serialize)]
pub struct DeviceLoginUser {
    pub id: DbId,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
    pub device_id: Option<String>,
    pub profile: Option<UserProfile>,
    pub patients: Vec<Patient>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/register
///
/// Create a `user` account together with its profile, settings and primary
/// patient record. Returns 201 with session tokens.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AuthResponse>>)> {
    input.validate()?;
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let email = input.email.trim().to_lowercase();
    if email == PUBLIC_DEVICE_EMAIL {
        return Err(AppError::Core(CoreError::Conflict(
            "This email address is reserved".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email,
            password_hash,
            name: input.name.clone(),
            role: ROLE_USER.to_string(),
        },
    )
    .await?;

    let (first_name, last_name) = split_name(user.name.as_deref());
    ProfileRepo::get_or_create(&state.pool, user.id).await?;
    SettingsRepo::get_or_create(&state.pool, user.id).await?;
    PatientRepo::create(
        &state.pool,
        &CreatePatient {
            user_id: user.id,
            first_name,
            last_name,
            ..Default::default()
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "User registered");
    let response = create_auth_response(&state, &user).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

/// POST /api/auth/login
///
/// Authenticate with email + password. Returns access and refresh tokens.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let user = authenticate(&state, &input.email, &input.password).await?;
    UserRepo::record_login(&state.pool, user.id).await?;

    let response = create_auth_response(&state, &user).await?;
    Ok(Json(DataResponse { data: response }))
}

/// POST /api/auth/refresh
///
/// Exchange a valid refresh token for new access + refresh tokens.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    // Single-use: consuming revokes the presented token.
    let session = SessionRepo::consume(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let response = create_auth_response(&state, &user).await?;
    Ok(Json(DataResponse { data: response }))
}

/// POST /api/auth/logout
///
/// Revoke all sessions for the authenticated user. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    let revoked = SessionRepo::revoke_all_for_user(&state.pool, auth_user.user_id).await?;
    tracing::info!(user_id = auth_user.user_id, revoked, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/auth/device/login
///
/// Authenticate a scanning device, pair its `device_id` with the account and
/// issue a fresh API token.
pub async fn device_login(
    State(state): State<AppState>,
    Json(input): Json<DeviceLoginRequest>,
) -> AppResult<Json<DataResponse<DeviceLoginResponse>>> {
    let (Some(email), Some(password), Some(device_id)) = (
        non_empty(input.email),
        non_empty(input.password),
        non_empty(input.device_id),
    ) else {
        return Err(AppError::BadRequest(
            "Email, password, and device ID are required".into(),
        ));
    };

    let user = authenticate(&state, &email, &password).await?;
    let token = generate_api_token();
    let user = UserRepo::set_api_token(&state.pool, user.id, &token.hash, Some(&device_id)).await?;

    let profile = ProfileRepo::find_by_user(&state.pool, user.id).await?;
    let patients = PatientRepo::list_for_user(&state.pool, user.id).await?;

    tracing::info!(user_id = user.id, device_id = %device_id, token_prefix = %token.prefix, "Device paired");

    Ok(Json(DataResponse {
        data: DeviceLoginResponse {
            user: DeviceLoginUser {
                id: user.id,
                email: user.email,
                name: user.name,
                role: user.role,
                device_id: user.device_id,
                profile,
                patients,
            },
            api_token: token.plaintext,
        },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Look up a user by email and check the password and active flag.
///
/// Unknown email and wrong password share one 401 message.
pub(crate) async fn authenticate(state: &AppState, email: &str, password: &str) -> AppResult<User> {
    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid email or password".into()));

    let email = email.trim().to_lowercase();
    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::warn!(user_id = user.id, "Rejected login with wrong password");
        return Err(invalid());
    }

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    Ok(user)
}

/// Split a display name into first / last, defaulting to `"User"` / `""`.
pub(crate) fn split_name(name: Option<&str>) -> (String, String) {
    let mut parts = name.unwrap_or_default().split_whitespace();
    let first = parts.next().unwrap_or("User").to_string();
    let last = parts.next().unwrap_or_default().to_string();
    (first, last)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Generate access + refresh tokens, persist a session row, and build the response.
async fn create_auth_response(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let access_token = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();

    let purged = SessionRepo::purge_dead_for_user(&state.pool, user.id).await?;
    if purged > 0 {
        tracing::debug!(user_id = user.id, purged, "Removed dead sessions");
    }

    let session = CreateSession::expiring_in(
        user.id,
        refresh_hash,
        chrono::Duration::days(state.config.jwt.refresh_token_expiry_days),
    );
    SessionRepo::create(&state.pool, &session).await?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        expires_in: state.config.jwt.access_token_ttl_secs(),
        user: UserResponse::from(user),
    })
}
