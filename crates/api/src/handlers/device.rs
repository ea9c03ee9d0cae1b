//! Handlers for the `/device` resource: vitals pushed by paired scanning
//! devices authenticated with an API token.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use healthvitals_core::error::CoreError;
use healthvitals_core::types::DbId;
use healthvitals_core::vitals::{format_blood_pressure, SOURCE_DEVICE};
use healthvitals_db::models::face_scan::{CreateFaceScan, FaceScan};
use healthvitals_db::models::patient::{CreatePatient, Patient};
use healthvitals_db::models::user::User;
use healthvitals_db::models::vitals::{CreateVitals, Vitals, VitalsReading, VitalsWithOwner};
use healthvitals_db::repositories::vitals_repo::VitalsFilter;
use healthvitals_db::repositories::{FaceScanRepo, PatientRepo, ProfileRepo, VitalsRepo};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::error::AppResult;
use crate::handlers::auth::split_name;
use crate::handlers::UNSPECIFIED_GENDER;
use crate::middleware::device::DeviceUser;
use crate::query::{clamp_limit, DEFAULT_PAGE_LIMIT};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FaceScanInput {
    pub data: Option<Value>,
    pub image_url: Option<String>,
    pub confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct DeviceVitalsRequest {
    /// Defaults to the owner's primary patient.
    pub patient_id: Option<DbId>,
    #[serde(default)]
    pub vitals: VitalsReading,
    pub face_scan: Option<FaceScanInput>,
    /// Defaults to the device paired with the token.
    pub device_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeviceVitalsResponse {
    pub vital: Vitals,
    pub face_scan: Option<FaceScan>,
    /// Present only when this submission created the patient.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<Patient>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeviceVitalsParams {
    pub limit: Option<i64>,
    pub patient_id: Option<DbId>,
}

/// POST /api/device/vitals
///
/// Store one reading, optionally with its face scan. Zero readings are
/// stored as unmeasured and the rest are range-checked. A patient is created
/// from the owner's profile when the account has none yet.
pub async fn record_vitals(
    State(state): State<AppState>,
    DeviceUser(user): DeviceUser,
    Json(input): Json<DeviceVitalsRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<DeviceVitalsResponse>>)> {
    let mut reading = input.vitals.normalized();
    reading.range_checked_fields().validate()?;
    if reading.blood_pressure.is_none() {
        reading.blood_pressure =
            format_blood_pressure(reading.blood_pressure_systolic, reading.blood_pressure_diastolic);
    }

    let device_id = input.device_id.clone().or_else(|| user.device_id.clone());

    let (patient, created_patient) = match input.patient_id {
        Some(id) => {
            let patient = PatientRepo::find_for_user(&state.pool, id, user.id)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "patient",
                    id,
                })?;
            (patient, false)
        }
        None => match PatientRepo::find_primary_for_user(&state.pool, user.id).await? {
            Some(patient) => (patient, false),
            None => (create_patient_from_profile(&state, &user).await?, true),
        },
    };

    let face_scan = match input.face_scan {
        Some(scan) => Some(
            FaceScanRepo::create(
                &state.pool,
                &CreateFaceScan {
                    user_id: user.id,
                    confidence: scan.confidence,
                    image_url: scan.image_url,
                    scan_data: scan.data.unwrap_or_else(|| Value::Object(Default::default())),
                    device_id: device_id.clone(),
                },
            )
            .await?,
        ),
        None => None,
    };

    let vital = VitalsRepo::create(
        &state.pool,
        &CreateVitals {
            patient_id: Some(patient.id),
            user_id: Some(user.id),
            face_scan_id: face_scan.as_ref().map(|f| f.id),
            source: SOURCE_DEVICE.to_string(),
            recorded_by: device_id.clone(),
            recorded_at: None,
            reading,
        },
    )
    .await?;

    tracing::info!(
        vitals_id = vital.id,
        user_id = user.id,
        patient_id = patient.id,
        device_id = ?device_id,
        "Device vitals recorded"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: DeviceVitalsResponse {
                vital,
                face_scan,
                patient: created_patient.then_some(patient),
            },
        }),
    ))
}

/// GET /api/device/vitals?limit=&patient_id=
///
/// The token owner's most recent readings with patient names.
pub async fn list_vitals(
    State(state): State<AppState>,
    DeviceUser(user): DeviceUser,
    Query(params): Query<DeviceVitalsParams>,
) -> AppResult<Json<DataResponse<Vec<VitalsWithOwner>>>> {
    let filter = VitalsFilter {
        user_id: Some(user.id),
        patient_id: params.patient_id,
        ..Default::default()
    };
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT);
    let vitals = VitalsRepo::list_with_owner(&state.pool, &filter, limit).await?;
    Ok(Json(DataResponse { data: vitals }))
}

/// First patient for a device account, seeded from its profile.
async fn create_patient_from_profile(state: &AppState, user: &User) -> AppResult<Patient> {
    let profile = ProfileRepo::find_by_user(&state.pool, user.id).await?;
    let (fallback_first, fallback_last) = split_name(user.name.as_deref());

    let input = match profile {
        Some(p) => CreatePatient {
            user_id: user.id,
            first_name: p.first_name.filter(|n| !n.is_empty()).unwrap_or(fallback_first),
            last_name: p.last_name.unwrap_or(fallback_last),
            date_of_birth: p.date_of_birth,
            gender: Some(p.gender.unwrap_or_else(|| UNSPECIFIED_GENDER.to_string())),
            height: p.height,
            weight: p.weight,
            blood_type: p.blood_type,
            phone_number: p.phone_number,
            address: p.address,
            emergency_contact: p.emergency_contact,
            ..Default::default()
        },
        None => CreatePatient {
            user_id: user.id,
            first_name: fallback_first,
            last_name: fallback_last,
            gender: Some(UNSPECIFIED_GENDER.to_string()),
            ..Default::default()
        },
    };

    let patient = PatientRepo::create(&state.pool, &input).await?;
    tracing::info!(user_id = user.id, patient_id = patient.id, "Patient created for device");
    Ok(patient)
}
