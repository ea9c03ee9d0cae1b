//! Handlers for the `/settings` resource, including the full account export.

use axum::extract::{Query, State};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use healthvitals_core::calculations::UnitSystem;
use healthvitals_core::export::{account_csv, ExportFormat};
use healthvitals_db::models::settings::{UpdateSettings, UserSettings};
use healthvitals_db::models::user::UserResponse;
use healthvitals_db::repositories::{
    PatientRepo, ProfileRepo, SettingsRepo, UserRepo, VitalsRepo,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{attachment, DataResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ExportParams {
    /// `json` or `csv`. Falls back to the user's saved `export_format`.
    pub format: Option<String>,
}

/// GET /api/settings
pub async fn get_settings(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<UserSettings>>> {
    let settings = SettingsRepo::get_or_create(&state.pool, auth_user.user_id).await?;
    Ok(Json(DataResponse { data: settings }))
}

/// PUT /api/settings
///
/// Partial update; fields absent from the body keep their current value.
pub async fn update_settings(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(input): Json<UpdateSettings>,
) -> AppResult<Json<DataResponse<UserSettings>>> {
    if let Some(unit_system) = input.unit_system.as_deref() {
        UnitSystem::parse(unit_system)?;
    }
    if let Some(format) = input.export_format.as_deref() {
        ExportFormat::parse(format).ok_or_else(|| unsupported_format(format))?;
    }

    let settings = SettingsRepo::upsert(&state.pool, auth_user.user_id, &input).await?;
    tracing::info!(user_id = auth_user.user_id, "Settings updated");
    Ok(Json(DataResponse { data: settings }))
}

/// GET /api/settings/export?format=json|csv
///
/// Download everything stored for the caller: account, profile, settings,
/// patients and all of their vitals. Stamps `last_export_at`.
pub async fn export_data(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<ExportParams>,
) -> AppResult<Response> {
    let user_id = auth_user.user_id;
    let (user, profile, settings, patients) = tokio::try_join!(
        UserRepo::find_by_id(&state.pool, user_id),
        ProfileRepo::find_by_user(&state.pool, user_id),
        SettingsRepo::get_or_create(&state.pool, user_id),
        PatientRepo::list_for_user(&state.pool, user_id),
    )?;
    let user = user.ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let requested = params.format.as_deref().unwrap_or(&settings.export_format);
    let format = ExportFormat::parse(requested).ok_or_else(|| unsupported_format(requested))?;

    let patient_ids: Vec<_> = patients.iter().map(|p| p.id).collect();
    let vitals = VitalsRepo::list_for_patients(&state.pool, &patient_ids).await?;

    let account = AccountExport {
        user: UserResponse::from(&user),
        profile: to_value(&profile)?,
        settings: to_value(&settings)?,
    };

    let timestamp = Utc::now().format("%Y%m%d%H%M%S");
    let response = match format {
        ExportFormat::Json => {
            let mut body = to_value(&account)?;
            body["patients"] = to_value(&patients)?;
            body["vitals"] = to_value(&vitals)?;
            let text = serde_json::to_string_pretty(&body)
                .map_err(|e| AppError::InternalError(format!("Export encoding failed: {e}")))?;
            attachment("application/json", &format!("user-data-{timestamp}.json"), text)
        }
        ExportFormat::Csv => {
            let records = vitals.iter().map(to_value).collect::<AppResult<Vec<_>>>()?;
            let csv = account_csv(&to_value(&account)?, &records, "vitals");
            attachment(
                "text/csv; charset=utf-8",
                &format!("user-data-{timestamp}.csv"),
                csv,
            )
        }
    };

    SettingsRepo::mark_exported(&state.pool, user_id).await?;
    tracing::info!(user_id, records = vitals.len(), "Account data exported");
    Ok(response)
}

#[derive(Debug, Serialize)]
struct AccountExport {
    user: UserResponse,
    profile: Value,
    settings: Value,
}

fn to_value<T: Serialize>(value: &T) -> AppResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| AppError::InternalError(format!("Export encoding failed: {e}")))
}

fn unsupported_format(format: &str) -> AppError {
    AppError::BadRequest(format!(
        "Unsupported export format '{format}'. Expected json or csv"
    ))
}
