//! Handlers for the `/mobile` resource used by the scanning app.
//!
//! Scan submissions may be anonymous; they are then filed under the shared
//! public device account. Results and reports require the caller's API token.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use healthvitals_core::api_tokens::generate_api_token;
use healthvitals_core::calculations::{approximate_birth_date, bmi_from_metric, calculate_age};
use healthvitals_core::ecg::{self, EcgInput};
use healthvitals_core::report::{render_scan_report, ReportSection};
use healthvitals_core::types::{DbId, Timestamp};
use healthvitals_core::vitals::{
    format_blood_pressure, parse_blood_pressure, ScanBiometrics, VitalsSnapshot, SOURCE_MOBILE,
};
use healthvitals_db::models::face_scan::CreateFaceScan;
use healthvitals_db::models::patient::{CreatePatient, Patient, UpdatePatientBiometrics};
use healthvitals_db::models::profile::ProfileBiometrics;
use healthvitals_db::models::user::User;
use healthvitals_db::models::vitals::{CreateVitals, Vitals, VitalsReading};
use healthvitals_db::repositories::vitals_repo::VitalsFilter;
use healthvitals_db::repositories::{FaceScanRepo, PatientRepo, ProfileRepo, UserRepo, VitalsRepo};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::auth::{authenticate, split_name};
use crate::handlers::UNSPECIFIED_GENDER;
use crate::middleware::device::{DeviceUser, OptionalDeviceUser};
use crate::query::{clamp_limit, DEFAULT_PAGE_LIMIT};
use crate::response::DataResponse;
use crate::state::AppState;

/// Device id recorded on face scans submitted through the app.
const MOBILE_DEVICE_ID: &str = "mobile";

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct MobileLoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MobileProfile {
    pub first_name: String,
    pub last_name: String,
    pub age: Option<i32>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub gender: String,
}

#[derive(Debug, Serialize)]
pub struct MobileLoginResponse {
    pub user_id: DbId,
    pub email: String,
    pub name: String,
    pub api_token: String,
    pub profile: MobileProfile,
    pub patient_id: Option<DbId>,
}

/// POST /api/mobile/login
///
/// Exchange email + password for a fresh API token. Any previously issued
/// token stops working.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<MobileLoginRequest>,
) -> AppResult<Json<DataResponse<MobileLoginResponse>>> {
    let (Some(email), Some(password)) = (
        input.email.filter(|e| !e.trim().is_empty()),
        input.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::BadRequest("Email and password are required".into()));
    };

    let user = authenticate(&state, &email, &password).await?;
    let token = generate_api_token();
    let user = UserRepo::set_api_token(&state.pool, user.id, &token.hash, None).await?;

    let (profile, patient) = tokio::try_join!(
        ProfileRepo::find_by_user(&state.pool, user.id),
        PatientRepo::find_primary_for_user(&state.pool, user.id),
    )?;

    let first_name = profile
        .as_ref()
        .and_then(|p| p.first_name.clone())
        .unwrap_or_default();
    let last_name = profile
        .as_ref()
        .and_then(|p| p.last_name.clone())
        .unwrap_or_default();
    let name = user
        .name
        .clone()
        .unwrap_or_else(|| format!("{first_name} {last_name}").trim().to_string());
    let today = Utc::now().date_naive();

    tracing::info!(user_id = user.id, token_prefix = %token.prefix, "Mobile token issued");

    Ok(Json(DataResponse {
        data: MobileLoginResponse {
            user_id: user.id,
            email: user.email,
            name,
            api_token: token.plaintext,
            profile: MobileProfile {
                age: profile
                    .as_ref()
                    .and_then(|p| p.date_of_birth)
                    .map(|dob| calculate_age(dob, today)),
                height: profile.as_ref().and_then(|p| p.height),
                weight: profile.as_ref().and_then(|p| p.weight),
                gender: profile
                    .as_ref()
                    .and_then(|p| p.gender.clone())
                    .unwrap_or_default(),
                first_name,
                last_name,
            },
            patient_id: patient.map(|p| p.id),
        },
    }))
}

// ---------------------------------------------------------------------------
// Scan submission
// ---------------------------------------------------------------------------

/// Fields the scanning app may send. Numbers are accepted as JSON numbers or
/// numeric strings; zero and empty values count as "not measured". The
/// camelCase fields are kept for older app builds and only fill gaps.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScanPayload {
    #[serde(deserialize_with = "lenient::string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub phone_number: Option<String>,
    #[serde(deserialize_with = "lenient::int")]
    pub age: Option<i32>,
    #[serde(deserialize_with = "lenient::float")]
    pub height: Option<f64>,
    #[serde(deserialize_with = "lenient::float")]
    pub weight: Option<f64>,
    #[serde(deserialize_with = "lenient::string")]
    pub gender: Option<String>,

    #[serde(deserialize_with = "lenient::int")]
    pub heart_rate: Option<i32>,
    #[serde(deserialize_with = "lenient::float")]
    pub prq: Option<f64>,
    #[serde(deserialize_with = "lenient::int")]
    pub oxygen_saturation: Option<i32>,
    #[serde(deserialize_with = "lenient::string")]
    pub blood_pressure: Option<String>,
    #[serde(deserialize_with = "lenient::float")]
    pub breathing_rate: Option<f64>,
    #[serde(deserialize_with = "lenient::int")]
    pub respiratory_rate: Option<i32>,
    #[serde(deserialize_with = "lenient::float")]
    pub temperature: Option<f64>,

    #[serde(deserialize_with = "lenient::int")]
    pub heart_rate_conf_level: Option<i32>,
    #[serde(deserialize_with = "lenient::int")]
    pub breathing_rate_conf_level: Option<i32>,
    #[serde(deserialize_with = "lenient::int")]
    pub prq_conf_level: Option<i32>,
    #[serde(deserialize_with = "lenient::int")]
    pub hrv_sdnn_conf_level: Option<i32>,

    #[serde(deserialize_with = "lenient::float")]
    pub stress_level: Option<f64>,
    #[serde(deserialize_with = "lenient::string")]
    pub recovery_ability: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub stress_response: Option<String>,
    #[serde(deserialize_with = "lenient::float")]
    pub respiration: Option<f64>,

    #[serde(deserialize_with = "lenient::float")]
    pub hrv_sdnn: Option<f64>,
    #[serde(deserialize_with = "lenient::float")]
    pub pns_index: Option<f64>,
    #[serde(deserialize_with = "lenient::float")]
    pub sns_index: Option<f64>,
    #[serde(deserialize_with = "lenient::float")]
    pub sd1: Option<f64>,
    #[serde(deserialize_with = "lenient::float")]
    pub sd2: Option<f64>,
    #[serde(deserialize_with = "lenient::float")]
    pub rmssd: Option<f64>,
    #[serde(deserialize_with = "lenient::float")]
    pub mean_rri: Option<f64>,
    #[serde(deserialize_with = "lenient::float")]
    pub lf_hf: Option<f64>,

    #[serde(deserialize_with = "lenient::string")]
    pub diabetic_risk: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub hypertension_risk: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub high_fasting_glucose_risk: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub high_total_cholesterol_risk: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub low_hemoglobin_risk: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub ascvd_risk: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub heart_age: Option<String>,

    #[serde(deserialize_with = "lenient::float")]
    pub hemoglobin: Option<f64>,
    #[serde(deserialize_with = "lenient::float")]
    pub hba1c: Option<f64>,
    #[serde(deserialize_with = "lenient::float")]
    pub blood_glucose: Option<f64>,

    #[serde(deserialize_with = "lenient::float")]
    pub scan_confidence: Option<f64>,
    #[serde(deserialize_with = "lenient::string")]
    pub scan_image: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub notes: Option<String>,

    #[serde(flatten)]
    pub legacy: LegacyScanFields,
}

/// camelCase spellings sent by older app builds.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegacyScanFields {
    #[serde(deserialize_with = "lenient::string")]
    pub phone_number: Option<String>,
    #[serde(deserialize_with = "lenient::int")]
    pub heart_rate: Option<i32>,
    #[serde(deserialize_with = "lenient::int")]
    pub blood_pressure_systolic: Option<i32>,
    #[serde(deserialize_with = "lenient::int")]
    pub blood_pressure_diastolic: Option<i32>,
    #[serde(deserialize_with = "lenient::int")]
    pub oxygen_saturation: Option<i32>,
    #[serde(deserialize_with = "lenient::float")]
    pub blood_glucose: Option<f64>,
    #[serde(deserialize_with = "lenient::int")]
    pub respiratory_rate: Option<i32>,
    #[serde(deserialize_with = "lenient::float")]
    pub scan_confidence: Option<f64>,
    #[serde(deserialize_with = "lenient::string")]
    pub scan_image: Option<String>,
}

impl ScanPayload {
    fn has_biometrics(&self) -> bool {
        self.age.is_some() || self.height.is_some() || self.weight.is_some() || self.gender.is_some()
    }

    fn scan_confidence(&self) -> Option<f64> {
        self.scan_confidence.or(self.legacy.scan_confidence)
    }

    fn scan_image(&self) -> Option<String> {
        self.scan_image.clone().or_else(|| self.legacy.scan_image.clone())
    }

    /// Systolic / diastolic from the explicit fields, filled from a
    /// `"120/80"` string when missing.
    fn blood_pressure_pair(&self) -> (Option<i32>, Option<i32>) {
        let parsed = self.blood_pressure.as_deref().and_then(parse_blood_pressure);
        (
            self.legacy
                .blood_pressure_systolic
                .or(parsed.map(|(s, _)| s)),
            self.legacy
                .blood_pressure_diastolic
                .or(parsed.map(|(_, d)| d)),
        )
    }

    /// The vitals row to store for this scan.
    fn into_reading(self) -> VitalsReading {
        let (systolic, diastolic) = self.blood_pressure_pair();
        let blood_pressure = self
            .blood_pressure
            .clone()
            .or_else(|| format_blood_pressure(systolic, diastolic));
        let bmi = bmi_from_metric(self.weight, self.height);
        let legacy = self.legacy;

        VitalsReading {
            name: self.name,
            phone_number: self.phone_number.or(legacy.phone_number),
            heart_rate: self.heart_rate.or(legacy.heart_rate),
            prq: self.prq,
            oxygen_saturation: self.oxygen_saturation.or(legacy.oxygen_saturation),
            blood_pressure,
            blood_pressure_systolic: systolic,
            blood_pressure_diastolic: diastolic,
            breathing_rate: self.breathing_rate,
            respiratory_rate: self.respiratory_rate.or(legacy.respiratory_rate),
            temperature: self.temperature,
            heart_rate_conf_level: self.heart_rate_conf_level,
            breathing_rate_conf_level: self.breathing_rate_conf_level,
            prq_conf_level: self.prq_conf_level,
            hrv_sdnn_conf_level: self.hrv_sdnn_conf_level,
            stress_level: self.stress_level,
            recovery_ability: self.recovery_ability,
            stress_response: self.stress_response,
            respiration: self.respiration,
            hrv_sdnn: self.hrv_sdnn,
            pns_index: self.pns_index,
            sns_index: self.sns_index,
            sd1: self.sd1,
            sd2: self.sd2,
            rmssd: self.rmssd,
            mean_rri: self.mean_rri,
            lf_hf: self.lf_hf,
            diabetic_risk: self.diabetic_risk,
            hypertension_risk: self.hypertension_risk,
            high_fasting_glucose_risk: self.high_fasting_glucose_risk,
            high_total_cholesterol_risk: self.high_total_cholesterol_risk,
            low_hemoglobin_risk: self.low_hemoglobin_risk,
            ascvd_risk: self.ascvd_risk,
            heart_age: self.heart_age,
            hemoglobin: self.hemoglobin,
            hba1c: self.hba1c,
            blood_glucose: self.blood_glucose.or(legacy.blood_glucose),
            bmi,
            weight: self.weight,
            notes: self.notes,
            ..Default::default()
        }
        .normalized()
    }
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub scan_id: DbId,
    pub patient_id: DbId,
    pub timestamp: Timestamp,
    pub face_scan_id: Option<DbId>,
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub vitals: VitalsReading,
}

/// POST /api/mobile/scan
///
/// Store one scan. Updates the owner's profile and patient biometrics when
/// the scan reports them, and records a face scan when confidence or an
/// image is present.
pub async fn submit_scan(
    State(state): State<AppState>,
    OptionalDeviceUser(device_user): OptionalDeviceUser,
    Json(raw): Json<Value>,
) -> AppResult<(StatusCode, Json<DataResponse<ScanResponse>>)> {
    let payload = ScanPayload::deserialize(&raw)
        .map_err(|e| AppError::BadRequest(format!("Invalid scan payload: {e}")))?;
    ScanBiometrics {
        age: payload.age,
        height: payload.height,
        weight: payload.weight,
    }
    .validate()?;

    let user = match device_user {
        Some(user) => user,
        None => UserRepo::find_or_create_public_device_user(&state.pool)
            .await?
            .ok_or_else(|| {
                AppError::InternalError(
                    "Public device account email is held by a non-device account".into(),
                )
            })?,
    };

    if payload.has_biometrics() {
        let today = Utc::now().date_naive();
        ProfileRepo::upsert_biometrics(
            &state.pool,
            user.id,
            &ProfileBiometrics {
                height: payload.height,
                weight: payload.weight,
                gender: payload.gender.clone(),
                date_of_birth: payload.age.and_then(|age| approximate_birth_date(age, today)),
            },
        )
        .await?;
    }

    let patient = scan_patient(&state, &user, &payload).await?;

    let face_scan_id = match (payload.scan_confidence(), payload.scan_image()) {
        (None, None) => None,
        (confidence, image_url) => {
            let scan = FaceScanRepo::create(
                &state.pool,
                &CreateFaceScan {
                    user_id: user.id,
                    confidence,
                    image_url,
                    scan_data: raw.clone(),
                    device_id: Some(MOBILE_DEVICE_ID.to_string()),
                },
            )
            .await?;
            Some(scan.id)
        }
    };

    let vitals = VitalsRepo::create(
        &state.pool,
        &CreateVitals {
            patient_id: Some(patient.id),
            user_id: Some(user.id),
            face_scan_id,
            source: SOURCE_MOBILE.to_string(),
            recorded_by: None,
            recorded_at: None,
            reading: payload.into_reading(),
        },
    )
    .await?;

    tracing::info!(
        scan_id = vitals.id,
        user_id = user.id,
        patient_id = patient.id,
        face_scan_id = ?face_scan_id,
        "Scan stored"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ScanResponse {
                scan_id: vitals.id,
                patient_id: patient.id,
                timestamp: vitals.recorded_at,
                face_scan_id,
                name: vitals.reading.name.clone(),
                phone_number: vitals.reading.phone_number.clone(),
                vitals: vitals.reading,
            },
        }),
    ))
}

/// The owner's primary patient, created on first scan and otherwise
/// refreshed with any height / weight the scan reports.
async fn scan_patient(state: &AppState, user: &User, payload: &ScanPayload) -> AppResult<Patient> {
    let Some(patient) = PatientRepo::find_primary_for_user(&state.pool, user.id).await? else {
        let (first_name, last_name) = split_name(user.name.as_deref());
        let patient = PatientRepo::create(
            &state.pool,
            &CreatePatient {
                user_id: user.id,
                first_name,
                last_name,
                gender: Some(
                    payload
                        .gender
                        .clone()
                        .unwrap_or_else(|| UNSPECIFIED_GENDER.to_string()),
                ),
                height: payload.height,
                weight: payload.weight,
                ..Default::default()
            },
        )
        .await?;
        return Ok(patient);
    };

    if payload.height.is_none() && payload.weight.is_none() {
        return Ok(patient);
    }
    let updated = PatientRepo::update_biometrics(
        &state.pool,
        patient.id,
        &UpdatePatientBiometrics {
            height: payload.height,
            weight: payload.weight,
            gender: payload.gender.clone(),
        },
    )
    .await?;
    Ok(updated.unwrap_or(patient))
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ResultsParams {
    pub scan_id: Option<DbId>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ScanPatient {
    pub name: String,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub gender: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScanFaceSummary {
    pub confidence: Option<f64>,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Debug, Serialize)]
pub struct ScanDetail {
    pub scan_id: DbId,
    pub timestamp: Timestamp,
    pub patient: Option<ScanPatient>,
    pub vitals: VitalsReading,
    pub face_scan: Option<ScanFaceSummary>,
    pub notes: Option<String>,
    pub source: String,
}

#[derive(Debug, Serialize)]
pub struct ScanHeadline {
    pub heart_rate: Option<i32>,
    pub blood_pressure: Option<String>,
    pub oxygen_saturation: Option<i32>,
    pub temperature: Option<f64>,
    pub blood_glucose: Option<f64>,
    pub bmi: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ScanSummary {
    pub scan_id: DbId,
    pub timestamp: Timestamp,
    pub patient_name: String,
    pub vitals: ScanHeadline,
    pub scan_confidence: Option<f64>,
    pub source: String,
}

/// One detailed result, or a list of recent summaries.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ScanResults {
    Detail(Box<ScanDetail>),
    Summaries(Vec<ScanSummary>),
}

/// GET /api/mobile/results?scan_id=&limit=
pub async fn results(
    State(state): State<AppState>,
    DeviceUser(user): DeviceUser,
    Query(params): Query<ResultsParams>,
) -> AppResult<Json<DataResponse<ScanResults>>> {
    if let Some(scan_id) = params.scan_id {
        let detail = scan_detail(&state, &user, scan_id).await?;
        return Ok(Json(DataResponse {
            data: ScanResults::Detail(Box::new(detail)),
        }));
    }

    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT);
    let filter = VitalsFilter {
        user_id: Some(user.id),
        ..Default::default()
    };
    let rows = VitalsRepo::list_with_owner(&state.pool, &filter, limit).await?;

    let face_scan_ids: Vec<DbId> = rows.iter().filter_map(|r| r.vitals.face_scan_id).collect();
    let confidences: HashMap<DbId, Option<f64>> =
        FaceScanRepo::find_many(&state.pool, &face_scan_ids)
            .await?
            .into_iter()
            .map(|scan| (scan.id, scan.confidence))
            .collect();

    let summaries = rows
        .into_iter()
        .map(|row| {
            let v = &row.vitals;
            let patient_name = format!(
                "{} {}",
                row.patient_first_name.as_deref().unwrap_or_default(),
                row.patient_last_name.as_deref().unwrap_or_default()
            )
            .trim()
            .to_string();
            ScanSummary {
                scan_id: v.id,
                timestamp: v.recorded_at,
                patient_name,
                vitals: ScanHeadline {
                    heart_rate: v.reading.heart_rate,
                    blood_pressure: v.blood_pressure_display(),
                    oxygen_saturation: v.reading.oxygen_saturation,
                    temperature: v.reading.temperature,
                    blood_glucose: v.reading.blood_glucose,
                    bmi: v.reading.bmi,
                },
                scan_confidence: v
                    .face_scan_id
                    .and_then(|id| confidences.get(&id).copied().flatten()),
                source: v.source.clone(),
            }
        })
        .collect();

    Ok(Json(DataResponse {
        data: ScanResults::Summaries(summaries),
    }))
}

async fn scan_detail(state: &AppState, user: &User, scan_id: DbId) -> AppResult<ScanDetail> {
    let vitals = find_scan(state, user, scan_id).await?;

    let patient = match vitals.patient_id {
        Some(id) => PatientRepo::find_by_id(&state.pool, id).await?,
        None => None,
    };
    let face_scan = match vitals.face_scan_id {
        Some(id) => FaceScanRepo::find_by_id(&state.pool, id).await?,
        None => None,
    };

    let mut reading = vitals.reading.clone();
    reading.blood_pressure = vitals.blood_pressure_display();

    Ok(ScanDetail {
        scan_id: vitals.id,
        timestamp: vitals.recorded_at,
        patient: patient.map(|p| ScanPatient {
            name: p.full_name(),
            height: p.height,
            weight: p.weight,
            gender: p.gender,
        }),
        notes: reading.notes.clone(),
        vitals: reading,
        face_scan: face_scan.map(|f| ScanFaceSummary {
            confidence: f.confidence,
            image_url: f.image_url,
            created_at: f.created_at,
        }),
        source: vitals.source,
    })
}

async fn find_scan(state: &AppState, user: &User, scan_id: DbId) -> AppResult<Vitals> {
    VitalsRepo::find_for_user(&state.pool, scan_id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Scan not found".into()))
}

// ---------------------------------------------------------------------------
// PDF report
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub scan_id: Option<DbId>,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub scan_id: DbId,
    pub report_date: Timestamp,
    pub pdf_base64: String,
    pub file_name: String,
}

/// POST /api/mobile/report
///
/// Render the caller's scan as a PDF and return it base64-encoded.
pub async fn report(
    State(state): State<AppState>,
    DeviceUser(user): DeviceUser,
    Json(input): Json<ReportRequest>,
) -> AppResult<Json<DataResponse<ReportResponse>>> {
    let scan_id = input
        .scan_id
        .ok_or_else(|| AppError::BadRequest("Scan ID is required".into()))?;

    let scan = VitalsRepo::find_with_owner_for_user(&state.pool, scan_id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Scan not found".into()))?;

    let patient_name = format!(
        "{} {}",
        scan.patient_first_name.as_deref().unwrap_or_default(),
        scan.patient_last_name.as_deref().unwrap_or_default()
    );
    let subject = scan
        .vitals
        .reading
        .name
        .clone()
        .or_else(|| Some(patient_name.trim().to_string()).filter(|n| !n.is_empty()))
        .or_else(|| scan.owner_name.clone())
        .unwrap_or_else(|| "Unknown".to_string());

    let html = render_scan_report(
        &subject,
        scan.vitals.recorded_at,
        scan.vitals.id,
        &scan_sections(&scan.vitals),
    );
    let pdf = state
        .pdf_renderer()
        .render(&html)
        .await
        .map_err(|e| AppError::InternalError(format!("PDF rendering failed: {e}")))?;

    tracing::info!(scan_id, user_id = user.id, bytes = pdf.len(), "Scan report rendered");

    Ok(Json(DataResponse {
        data: ReportResponse {
            scan_id,
            report_date: Utc::now(),
            pdf_base64: BASE64.encode(&pdf),
            file_name: format!("health-report-{scan_id}.pdf"),
        },
    }))
}

fn scan_sections(vitals: &Vitals) -> Vec<ReportSection> {
    let r = &vitals.reading;
    let ecg = ecg::metrics(&EcgInput::from_snapshot(&VitalsSnapshot::from(vitals)));

    vec![
        ReportSection::new("Patient Information")
            .row("Name", r.name.as_deref())
            .row("Phone", r.phone_number.as_deref())
            .row("Source", Some(&vitals.source)),
        ReportSection::new("Vital Signs")
            .row("Heart Rate (bpm)", r.heart_rate)
            .row("Oxygen Saturation (%)", r.oxygen_saturation)
            .row("Blood Pressure (mmHg)", vitals.blood_pressure_display())
            .row("Temperature (°C)", r.temperature)
            .row("Breathing Rate", r.breathing_rate)
            .row("Blood Glucose (mg/dL)", r.blood_glucose)
            .row("BMI", r.bmi),
        ReportSection::new("Stress & HRV Analysis")
            .row("Stress Level", r.stress_level)
            .row("Recovery Ability", r.recovery_ability.as_deref())
            .row("Stress Response", r.stress_response.as_deref())
            .row("HRV SDNN (ms)", r.hrv_sdnn)
            .row("RMSSD (ms)", r.rmssd)
            .row("PNS Index", r.pns_index)
            .row("SNS Index", r.sns_index)
            .row("LF/HF", r.lf_hf),
        ReportSection::new("Health Risk Assessment")
            .row("Diabetic Risk", r.diabetic_risk.as_deref())
            .row("Hypertension Risk", r.hypertension_risk.as_deref())
            .row("High Fasting Glucose Risk", r.high_fasting_glucose_risk.as_deref())
            .row("High Total Cholesterol Risk", r.high_total_cholesterol_risk.as_deref())
            .row("Low Hemoglobin Risk", r.low_hemoglobin_risk.as_deref())
            .row("ASCVD Risk", r.ascvd_risk.as_deref())
            .row("Heart Age", r.heart_age.as_deref()),
        ReportSection::new("Blood Metrics")
            .row("Hemoglobin (g/dL)", r.hemoglobin)
            .row("HbA1c (%)", r.hba1c),
        ReportSection::new("ECG Metrics")
            .row("PR Interval (ms)", Some(ecg.pr_interval))
            .row("QRS Duration (ms)", Some(ecg.qrs_duration))
            .row("QT Interval (ms)", Some(ecg.qt_interval))
            .row("QTc Interval (ms)", Some(ecg.qtc_interval))
            .row("RR Interval (ms)", Some(ecg.rr_interval)),
    ]
}

// ---------------------------------------------------------------------------
// Lenient field parsing
// ---------------------------------------------------------------------------

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn number(value: Option<Value>) -> Option<f64> {
        let parsed = match value? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed.filter(|v| v.is_finite() && *v != 0.0)
    }

    pub fn float<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(number(Option::<Value>::deserialize(d)?))
    }

    /// Fractional values are truncated.
    pub fn int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i32>, D::Error> {
        Ok(number(Option::<Value>::deserialize(d)?)
            .map(|v| v.trunc())
            .filter(|v| *v >= f64::from(i32::MIN) && *v <= f64::from(i32::MAX))
            .map(|v| v as i32)
            .filter(|v| *v != 0))
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }
}
