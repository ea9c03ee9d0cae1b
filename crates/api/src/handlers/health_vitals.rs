//! Handlers for the `/health-vitals` resource.
//!
//! Every route is scoped to the caller's primary patient record. Users
//! without one see empty results rather than errors, except on create.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use healthvitals_core::analytics::{self, AnalyticsReport, MetricChange, Period};
use healthvitals_core::calculations::{bmi_from_metric, calculate_age};
use healthvitals_core::ecg::{self, EcgInput, EcgTrace, Lead};
use healthvitals_core::error::CoreError;
use healthvitals_core::export::vitals_csv;
use healthvitals_core::health::{assess, health_score, HealthStatus};
use healthvitals_core::report::{render_period_report, PeriodReport};
use healthvitals_core::types::{parse_timestamp_bound, DayEdge, DbId, Timestamp};
use healthvitals_core::vitals::{VitalsEntry, VitalsSnapshot, SOURCE_WEB};
use healthvitals_db::models::patient::Patient;
use healthvitals_db::models::vitals::{CreateVitals, Vitals, VitalsReading};
use healthvitals_db::repositories::vitals_repo::VitalsFilter;
use healthvitals_db::repositories::{PatientRepo, VitalsRepo};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PageParams;
use crate::response::{attachment, DataResponse, PagedResponse, Pagination};
use crate::state::AppState;

/// Width and height of the SVG viewport the ECG path is scaled to.
const ECG_SVG_WIDTH: f64 = 1000.0;
const ECG_SVG_HEIGHT: f64 = 200.0;

// ---------------------------------------------------------------------------
// Query / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ListVitalsParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// `YYYY-MM-DD` or RFC 3339.
    pub start_date: Option<String>,
    /// `YYYY-MM-DD` (inclusive, whole day) or RFC 3339.
    pub end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PeriodParams {
    pub period: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
    pub period: Option<String>,
    pub format: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EcgParams {
    pub lead: Option<String>,
    pub duration: Option<u32>,
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct PatientSummary {
    pub id: DbId,
    pub name: String,
    pub age: Option<i32>,
    pub blood_type: Option<String>,
}

impl From<&Patient> for PatientSummary {
    fn from(patient: &Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.full_name(),
            age: patient
                .date_of_birth
                .map(|dob| calculate_age(dob, Utc::now().date_naive())),
            blood_type: patient.blood_type.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LatestVitals {
    pub current: Vitals,
    pub previous: Option<Vitals>,
    pub changes: BTreeMap<&'static str, MetricChange>,
    pub health_status: HealthStatus,
    pub health_score: u32,
    pub patient: PatientSummary,
}

#[derive(Debug, Serialize)]
pub struct EcgResponse {
    pub vitals_id: DbId,
    #[serde(flatten)]
    pub trace: EcgTrace,
    pub svg_path: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/health-vitals
///
/// Record a reading for the caller's primary patient. BMI is derived from
/// the submitted weight (or the patient's) and the patient's height when the
/// client does not send one.
pub async fn create_vitals(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(entry): Json<VitalsEntry>,
) -> AppResult<(StatusCode, Json<DataResponse<Vitals>>)> {
    entry.validate()?;

    let patient = PatientRepo::find_primary_for_user(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Patient profile not found".into()))?;

    let recorded_at = entry.recorded_at;
    let mut reading = VitalsReading::from(entry);
    if reading.bmi.is_none() {
        reading.bmi = bmi_from_metric(reading.weight.or(patient.weight), patient.height);
    }

    let vitals = VitalsRepo::create(
        &state.pool,
        &CreateVitals {
            patient_id: Some(patient.id),
            user_id: Some(auth_user.user_id),
            face_scan_id: None,
            source: SOURCE_WEB.to_string(),
            recorded_by: Some(auth_user.user_id.to_string()),
            recorded_at,
            reading,
        },
    )
    .await?;

    tracing::info!(
        vitals_id = vitals.id,
        patient_id = patient.id,
        user_id = auth_user.user_id,
        "Vitals recorded"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: vitals })))
}

/// GET /api/health-vitals
///
/// Paged history, newest first, optionally bounded by `start_date` / `end_date`.
pub async fn list_vitals(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<ListVitalsParams>,
) -> AppResult<Json<PagedResponse<Vitals>>> {
    let page = PageParams {
        page: params.page,
        limit: params.limit,
    };
    let from = params
        .start_date
        .as_deref()
        .map(|v| parse_date_bound(v, DayEdge::Start))
        .transpose()?;
    let to = params
        .end_date
        .as_deref()
        .map(|v| parse_date_bound(v, DayEdge::End))
        .transpose()?;

    let Some(patient) = PatientRepo::find_primary_for_user(&state.pool, auth_user.user_id).await?
    else {
        return Ok(Json(PagedResponse {
            data: Vec::new(),
            pagination: Pagination::new(page.page(), page.limit(), 0),
        }));
    };

    let filter = VitalsFilter::for_patient(patient.id).between(from, to);
    let (items, total) = tokio::try_join!(
        VitalsRepo::list(&state.pool, &filter, page.limit(), page.offset()),
        VitalsRepo::count(&state.pool, &filter),
    )?;

    Ok(Json(PagedResponse {
        data: items,
        pagination: Pagination::new(page.page(), page.limit(), total),
    }))
}

/// GET /api/health-vitals/latest
///
/// The newest reading with the one before it, per-field changes, a status
/// assessment and a patient summary. `data` is `null` with no readings.
pub async fn latest_vitals(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<Option<LatestVitals>>>> {
    let Some(patient) = PatientRepo::find_primary_for_user(&state.pool, auth_user.user_id).await?
    else {
        return Ok(Json(DataResponse { data: None }));
    };
    let Some(current) = VitalsRepo::latest_for_patient(&state.pool, patient.id).await? else {
        return Ok(Json(DataResponse { data: None }));
    };
    let previous =
        VitalsRepo::previous_for_patient(&state.pool, patient.id, current.recorded_at).await?;

    let current_snapshot = VitalsSnapshot::from(&current);
    let changes = previous
        .as_ref()
        .map(|prev| analytics::compare(&current_snapshot, &VitalsSnapshot::from(prev)))
        .unwrap_or_default();

    Ok(Json(DataResponse {
        data: Some(LatestVitals {
            health_status: assess(&current_snapshot),
            health_score: health_score(Some(&current_snapshot)),
            changes,
            patient: PatientSummary::from(&patient),
            current,
            previous,
        }),
    }))
}

/// GET /api/health-vitals/analytics?period=7d|30d|90d|1y
pub async fn vitals_analytics(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<PeriodParams>,
) -> AppResult<Json<DataResponse<AnalyticsReport>>> {
    let period = Period::parse(params.period.as_deref());
    let end = Utc::now();
    let start = period.start_from(end);

    let snapshots = period_snapshots(&state, auth_user.user_id, start, end).await?;
    let report = analytics::analyze(&snapshots, period, start, end);
    Ok(Json(DataResponse { data: report }))
}

/// GET /api/health-vitals/{id}/ecg?lead=&duration=&seed=
///
/// Decorative ECG trace driven by the record's heart rate, HRV, stress and
/// SpO2. The same seed always yields the same samples.
pub async fn vitals_ecg(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    Query(params): Query<EcgParams>,
) -> AppResult<Json<DataResponse<EcgResponse>>> {
    let lead = params
        .lead
        .as_deref()
        .map(Lead::parse)
        .transpose()?
        .unwrap_or_default();
    let duration = ecg::validate_duration(params.duration)?;

    let vitals = VitalsRepo::find_for_user(&state.pool, id, auth_user.user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "vitals",
            id,
        })?;

    let input = EcgInput::from_snapshot(&VitalsSnapshot::from(&vitals));
    let seed = params.seed.unwrap_or_else(rand::random);
    let trace = ecg::synthesize(&input, lead, duration, seed);
    let svg_path = ecg::svg_path(&trace.samples, ECG_SVG_WIDTH, ECG_SVG_HEIGHT);

    Ok(Json(DataResponse {
        data: EcgResponse {
            vitals_id: vitals.id,
            trace,
            svg_path,
        },
    }))
}

/// GET /api/health-vitals/report?period=&format=html|pdf|csv
///
/// `html` (default) and `pdf` render the period summary; `csv` exports every
/// reading in the period.
pub async fn vitals_report(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<ReportParams>,
) -> AppResult<Response> {
    let format = params.format.as_deref().unwrap_or("html");
    if !matches!(format, "html" | "pdf" | "csv") {
        return Err(AppError::BadRequest(format!(
            "Unsupported report format '{format}'. Expected html, pdf or csv"
        )));
    }

    let period = Period::parse(params.period.as_deref());
    let end = Utc::now();
    let start = period.start_from(end);
    let snapshots = period_snapshots(&state, auth_user.user_id, start, end).await?;

    if format == "csv" {
        let filename = format!("health-vitals-{}.csv", end.format("%Y-%m-%d"));
        return Ok(attachment("text/csv; charset=utf-8", &filename, vitals_csv(&snapshots)));
    }

    let summary = analytics::summarize(&snapshots);
    let average = |key: &str| summary.get(key).map(|s| s.average);
    let html = render_period_report(&PeriodReport {
        period: period.as_str().to_string(),
        generated_at: end,
        average_systolic: average("blood_pressure_systolic"),
        average_heart_rate: average("heart_rate"),
        health_score: health_score(snapshots.last()),
        total_records: snapshots.len(),
    });

    if format == "html" {
        return Ok(([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html).into_response());
    }

    let pdf = state.pdf_renderer().render(&html).await.map_err(|e| {
        AppError::InternalError(format!("PDF rendering failed: {e}"))
    })?;
    let filename = format!("health-report-{}.pdf", period.as_str());
    Ok(attachment("application/pdf", &filename, pdf))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Readings for the caller's primary patient within `[start, end]`, oldest first.
async fn period_snapshots(
    state: &AppState,
    user_id: DbId,
    start: Timestamp,
    end: Timestamp,
) -> AppResult<Vec<VitalsSnapshot>> {
    let Some(patient) = PatientRepo::find_primary_for_user(&state.pool, user_id).await? else {
        return Ok(Vec::new());
    };
    let filter = VitalsFilter::for_patient(patient.id).between(Some(start), Some(end));
    let rows = VitalsRepo::list_ascending(&state.pool, &filter).await?;
    Ok(rows.iter().map(VitalsSnapshot::from).collect())
}

/// Parse a `start_date` / `end_date` query value, rejecting anything unparseable.
fn parse_date_bound(value: &str, edge: DayEdge) -> Result<Timestamp, AppError> {
    parse_timestamp_bound(value, edge).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Invalid date '{value}'. Expected YYYY-MM-DD or RFC 3339"
        ))
    })
}
