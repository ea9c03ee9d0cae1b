//! Repository for the `vitals` table.

use healthvitals_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::vitals::{CreateVitals, Vitals, VitalsReading, VitalsWithOwner, READING_COLUMNS};

/// Non-measurement columns preceding the reading columns.
const HEAD_COLUMNS: &[&str] = &[
    "id",
    "patient_id",
    "user_id",
    "face_scan_id",
    "source",
    "recorded_by",
    "recorded_at",
];

const TAIL_COLUMNS: &[&str] = &["created_at", "updated_at"];

/// Number of parameters bound ahead of the reading on insert.
const INSERT_HEAD_PARAMS: usize = 6;

/// Full select list, optionally qualified with a table alias.
fn columns(alias: Option<&str>) -> String {
    let prefix = alias.map(|a| format!("{a}.")).unwrap_or_default();
    HEAD_COLUMNS
        .iter()
        .chain(READING_COLUMNS)
        .chain(TAIL_COLUMNS)
        .map(|c| format!("{prefix}{c}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Owner / patient columns appended to joined selects.
const OWNER_COLUMNS: &str = "u.email AS owner_email, u.name AS owner_name, \
                              p.first_name AS patient_first_name, p.last_name AS patient_last_name";

const OWNER_JOINS: &str = "LEFT JOIN users u ON u.id = v.user_id \
                           LEFT JOIN patients p ON p.id = v.patient_id";

/// Filters for listing vitals. All set filters are ANDed.
#[derive(Debug, Clone, Default)]
pub struct VitalsFilter {
    pub patient_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}

impl VitalsFilter {
    pub fn for_patient(patient_id: DbId) -> Self {
        Self {
            patient_id: Some(patient_id),
            ..Default::default()
        }
    }

    pub fn between(mut self, from: Option<Timestamp>, to: Option<Timestamp>) -> Self {
        self.from = from;
        self.to = to;
        self
    }
}

/// Text columns a record count can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VitalsGrouping {
    Source,
    DiabeticRisk,
    HypertensionRisk,
}

impl VitalsGrouping {
    fn column(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::DiabeticRisk => "diabetic_risk",
            Self::HypertensionRisk => "hypertension_risk",
        }
    }
}

/// Typed bind value for dynamically-built filter queries.
enum BindValue {
    BigInt(i64),
    Timestamp(Timestamp),
}

/// Build a WHERE clause from a [`VitalsFilter`].
///
/// Returns `(where_clause, bind_values, next_bind_index)`. Column names are
/// qualified with `v.` so the clause works in joined queries.
fn build_filter(filter: &VitalsFilter) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut bind_values: Vec<BindValue> = Vec::new();

    if let Some(patient_id) = filter.patient_id {
        conditions.push(format!("v.patient_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(patient_id));
    }

    if let Some(user_id) = filter.user_id {
        conditions.push(format!("v.user_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(user_id));
    }

    if let Some(from) = filter.from {
        conditions.push(format!("v.recorded_at >= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(from));
    }

    if let Some(to) = filter.to {
        conditions.push(format!("v.recorded_at <= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(to));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values, bind_idx)
}

type PgQueryAs<'q, O> = sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>;

fn bind_values<'q, O>(mut q: PgQueryAs<'q, O>, values: &'q [BindValue]) -> PgQueryAs<'q, O> {
    for val in values {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Timestamp(v) => q = q.bind(*v),
        }
    }
    q
}

/// Bind every reading field in [`READING_COLUMNS`] order.
fn bind_reading<'q, O>(q: PgQueryAs<'q, O>, r: &'q VitalsReading) -> PgQueryAs<'q, O> {
    q.bind(&r.name)
        .bind(&r.phone_number)
        .bind(r.heart_rate)
        .bind(r.prq)
        .bind(r.oxygen_saturation)
        .bind(&r.blood_pressure)
        .bind(r.blood_pressure_systolic)
        .bind(r.blood_pressure_diastolic)
        .bind(r.breathing_rate)
        .bind(r.respiratory_rate)
        .bind(r.temperature)
        .bind(r.heart_rate_conf_level)
        .bind(r.breathing_rate_conf_level)
        .bind(r.prq_conf_level)
        .bind(r.hrv_sdnn_conf_level)
        .bind(r.stress_level)
        .bind(&r.recovery_ability)
        .bind(&r.stress_response)
        .bind(r.respiration)
        .bind(r.hrv_sdnn)
        .bind(r.pns_index)
        .bind(r.sns_index)
        .bind(r.sd1)
        .bind(r.sd2)
        .bind(r.rmssd)
        .bind(r.mean_rri)
        .bind(r.lf_hf)
        .bind(&r.diabetic_risk)
        .bind(&r.hypertension_risk)
        .bind(&r.high_fasting_glucose_risk)
        .bind(&r.high_total_cholesterol_risk)
        .bind(&r.low_hemoglobin_risk)
        .bind(&r.ascvd_risk)
        .bind(&r.heart_age)
        .bind(r.hemoglobin)
        .bind(r.hba1c)
        .bind(r.blood_glucose)
        .bind(r.cholesterol_total)
        .bind(r.cholesterol_ldl)
        .bind(r.cholesterol_hdl)
        .bind(r.triglycerides)
        .bind(r.bmi)
        .bind(r.weight)
        .bind(r.pain_level)
        .bind(r.steps_count)
        .bind(r.calories_burned)
        .bind(r.sleep_hours)
        .bind(&r.sleep_quality)
        .bind(&r.notes)
        .bind(&r.symptoms)
}

/// Provides create and read operations for vitals. Records are immutable
/// once written, so there is no update or delete.
pub struct VitalsRepo;

impl VitalsRepo {
    /// Insert a vitals record, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateVitals) -> Result<Vitals, sqlx::Error> {
        let reading_params = (1..=READING_COLUMNS.len())
            .map(|i| format!("${}", i + INSERT_HEAD_PARAMS))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            "INSERT INTO vitals
                (patient_id, user_id, face_scan_id, source, recorded_by, recorded_at, {reading_columns})
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW()), {reading_params})
             RETURNING {returning}",
            reading_columns = READING_COLUMNS.join(", "),
            returning = columns(None),
        );

        let q = sqlx::query_as::<_, Vitals>(&query)
            .bind(input.patient_id)
            .bind(input.user_id)
            .bind(input.face_scan_id)
            .bind(&input.source)
            .bind(&input.recorded_by)
            .bind(input.recorded_at);
        bind_reading(q, &input.reading).fetch_one(pool).await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Vitals>, sqlx::Error> {
        let query = format!("SELECT {} FROM vitals WHERE id = $1", columns(None));
        sqlx::query_as::<_, Vitals>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a record only if it was filed under `user_id`.
    pub async fn find_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Vitals>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM vitals WHERE id = $1 AND user_id = $2",
            columns(None)
        );
        sqlx::query_as::<_, Vitals>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Page through matching records, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &VitalsFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Vitals>, sqlx::Error> {
        let (where_clause, values, idx) = build_filter(filter);
        let query = format!(
            "SELECT {} FROM vitals v {where_clause}
             ORDER BY v.recorded_at DESC, v.id DESC
             LIMIT ${idx} OFFSET ${}",
            columns(Some("v")),
            idx + 1
        );
        bind_values(sqlx::query_as::<_, Vitals>(&query), &values)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count matching records.
    pub async fn count(pool: &PgPool, filter: &VitalsFilter) -> Result<i64, sqlx::Error> {
        let (where_clause, values, _) = build_filter(filter);
        let query = format!("SELECT COUNT(*) FROM vitals v {where_clause}");
        let row: (i64,) = bind_values(sqlx::query_as::<_, (i64,)>(&query), &values)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Count matching records per distinct value of `grouping`. NULL values
    /// form their own group.
    pub async fn tally(
        pool: &PgPool,
        filter: &VitalsFilter,
        grouping: VitalsGrouping,
    ) -> Result<Vec<(Option<String>, i64)>, sqlx::Error> {
        let (where_clause, values, _) = build_filter(filter);
        let column = grouping.column();
        let query = format!(
            "SELECT v.{column}, COUNT(*) FROM vitals v {where_clause}
             GROUP BY v.{column} ORDER BY v.{column}"
        );
        bind_values(sqlx::query_as::<_, (Option<String>, i64)>(&query), &values)
            .fetch_all(pool)
            .await
    }

    /// All matching records, oldest first. Used for analytics and exports.
    pub async fn list_ascending(
        pool: &PgPool,
        filter: &VitalsFilter,
    ) -> Result<Vec<Vitals>, sqlx::Error> {
        let (where_clause, values, _) = build_filter(filter);
        let query = format!(
            "SELECT {} FROM vitals v {where_clause} ORDER BY v.recorded_at ASC, v.id ASC",
            columns(Some("v"))
        );
        bind_values(sqlx::query_as::<_, Vitals>(&query), &values)
            .fetch_all(pool)
            .await
    }

    /// Most recent record for a patient.
    pub async fn latest_for_patient(
        pool: &PgPool,
        patient_id: DbId,
    ) -> Result<Option<Vitals>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM vitals WHERE patient_id = $1
             ORDER BY recorded_at DESC, id DESC LIMIT 1",
            columns(None)
        );
        sqlx::query_as::<_, Vitals>(&query)
            .bind(patient_id)
            .fetch_optional(pool)
            .await
    }

    /// Most recent record strictly before `before` for a patient.
    pub async fn previous_for_patient(
        pool: &PgPool,
        patient_id: DbId,
        before: Timestamp,
    ) -> Result<Option<Vitals>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM vitals WHERE patient_id = $1 AND recorded_at < $2
             ORDER BY recorded_at DESC, id DESC LIMIT 1",
            columns(None)
        );
        sqlx::query_as::<_, Vitals>(&query)
            .bind(patient_id)
            .bind(before)
            .fetch_optional(pool)
            .await
    }

    /// Every record attached to any of `patient_ids`, oldest first.
    pub async fn list_for_patients(
        pool: &PgPool,
        patient_ids: &[DbId],
    ) -> Result<Vec<Vitals>, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM vitals WHERE patient_id = ANY($1)
             ORDER BY recorded_at ASC, id ASC",
            columns(None)
        );
        sqlx::query_as::<_, Vitals>(&query)
            .bind(patient_ids)
            .fetch_all(pool)
            .await
    }

    /// Newest matching records with owner and patient names.
    pub async fn list_with_owner(
        pool: &PgPool,
        filter: &VitalsFilter,
        limit: i64,
    ) -> Result<Vec<VitalsWithOwner>, sqlx::Error> {
        let (where_clause, values, idx) = build_filter(filter);
        let query = format!(
            "SELECT {}, {OWNER_COLUMNS} FROM vitals v {OWNER_JOINS} {where_clause}
             ORDER BY v.recorded_at DESC, v.id DESC
             LIMIT ${idx}",
            columns(Some("v"))
        );
        bind_values(sqlx::query_as::<_, VitalsWithOwner>(&query), &values)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// A single record with owner and patient names, scoped to `user_id`.
    pub async fn find_with_owner_for_user(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<VitalsWithOwner>, sqlx::Error> {
        let query = format!(
            "SELECT {}, {OWNER_COLUMNS} FROM vitals v {OWNER_JOINS}
             WHERE v.id = $1 AND v.user_id = $2",
            columns(Some("v"))
        );
        sqlx::query_as::<_, VitalsWithOwner>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }
}
