//! Vitals measurement model and DTOs.
//!
//! The measurement columns live in [`VitalsReading`], which is flattened
//! into the row struct so the same shape serves inserts, reads and device
//! payloads.

use healthvitals_core::types::{DbId, Timestamp};
use healthvitals_core::vitals::{VitalsEntry, VitalsSnapshot, SOURCE_WEB};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Measurement columns, in the order used by inserts.
pub const READING_COLUMNS: &[&str] = &[
    "name",
    "phone_number",
    "heart_rate",
    "prq",
    "oxygen_saturation",
    "blood_pressure",
    "blood_pressure_systolic",
    "blood_pressure_diastolic",
    "breathing_rate",
    "respiratory_rate",
    "temperature",
    "heart_rate_conf_level",
    "breathing_rate_conf_level",
    "prq_conf_level",
    "hrv_sdnn_conf_level",
    "stress_level",
    "recovery_ability",
    "stress_response",
    "respiration",
    "hrv_sdnn",
    "pns_index",
    "sns_index",
    "sd1",
    "sd2",
    "rmssd",
    "mean_rri",
    "lf_hf",
    "diabetic_risk",
    "hypertension_risk",
    "high_fasting_glucose_risk",
    "high_total_cholesterol_risk",
    "low_hemoglobin_risk",
    "ascvd_risk",
    "heart_age",
    "hemoglobin",
    "hba1c",
    "blood_glucose",
    "cholesterol_total",
    "cholesterol_ldl",
    "cholesterol_hdl",
    "triglycerides",
    "bmi",
    "weight",
    "pain_level",
    "steps_count",
    "calories_burned",
    "sleep_hours",
    "sleep_quality",
    "notes",
    "symptoms",
];

/// Every measured field of a vitals record. All optional.
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalsReading {
    // Subject details captured by scanning devices
    pub name: Option<String>,
    pub phone_number: Option<String>,

    // Basic vitals
    pub heart_rate: Option<i32>,
    pub prq: Option<f64>,
    pub oxygen_saturation: Option<i32>,
    pub blood_pressure: Option<String>,
    pub blood_pressure_systolic: Option<i32>,
    pub blood_pressure_diastolic: Option<i32>,
    pub breathing_rate: Option<f64>,
    pub respiratory_rate: Option<i32>,
    pub temperature: Option<f64>,

    // Confidence levels
    pub heart_rate_conf_level: Option<i32>,
    pub breathing_rate_conf_level: Option<i32>,
    pub prq_conf_level: Option<i32>,
    pub hrv_sdnn_conf_level: Option<i32>,

    // Stress & recovery
    pub stress_level: Option<f64>,
    pub recovery_ability: Option<String>,
    pub stress_response: Option<String>,
    pub respiration: Option<f64>,

    // HRV
    pub hrv_sdnn: Option<f64>,
    pub pns_index: Option<f64>,
    pub sns_index: Option<f64>,
    pub sd1: Option<f64>,
    pub sd2: Option<f64>,
    pub rmssd: Option<f64>,
    pub mean_rri: Option<f64>,
    pub lf_hf: Option<f64>,

    // Risk assessments
    pub diabetic_risk: Option<String>,
    pub hypertension_risk: Option<String>,
    pub high_fasting_glucose_risk: Option<String>,
    pub high_total_cholesterol_risk: Option<String>,
    pub low_hemoglobin_risk: Option<String>,
    pub ascvd_risk: Option<String>,
    pub heart_age: Option<String>,

    // Blood chemistry
    pub hemoglobin: Option<f64>,
    pub hba1c: Option<f64>,
    pub blood_glucose: Option<f64>,
    pub cholesterol_total: Option<f64>,
    pub cholesterol_ldl: Option<f64>,
    pub cholesterol_hdl: Option<f64>,
    pub triglycerides: Option<f64>,

    // Body
    pub bmi: Option<f64>,
    pub weight: Option<f64>,

    // Lifestyle
    pub pain_level: Option<i32>,
    pub steps_count: Option<i32>,
    pub calories_burned: Option<f64>,
    pub sleep_hours: Option<f64>,
    pub sleep_quality: Option<String>,

    pub notes: Option<String>,
    pub symptoms: Option<String>,
}

impl From<VitalsEntry> for VitalsReading {
    fn from(entry: VitalsEntry) -> Self {
        Self {
            blood_pressure: healthvitals_core::vitals::format_blood_pressure(
                entry.blood_pressure_systolic,
                entry.blood_pressure_diastolic,
            ),
            blood_pressure_systolic: entry.blood_pressure_systolic,
            blood_pressure_diastolic: entry.blood_pressure_diastolic,
            heart_rate: entry.heart_rate,
            respiratory_rate: entry.respiratory_rate,
            temperature: entry.temperature,
            oxygen_saturation: entry.oxygen_saturation,
            blood_glucose: entry.blood_glucose,
            cholesterol_total: entry.cholesterol_total,
            cholesterol_ldl: entry.cholesterol_ldl,
            cholesterol_hdl: entry.cholesterol_hdl,
            triglycerides: entry.triglycerides,
            bmi: entry.bmi,
            weight: entry.weight,
            pain_level: entry.pain_level,
            steps_count: entry.steps_count,
            calories_burned: entry.calories_burned,
            sleep_hours: entry.sleep_hours,
            sleep_quality: entry.sleep_quality,
            notes: entry.notes,
            symptoms: entry.symptoms,
            ..Default::default()
        }
    }
}

impl VitalsReading {
    /// Device sensors report `0` for "not measured". Zero and non-finite
    /// measurements become `None`, as do blank strings. Lifestyle fields
    /// (pain, steps, calories, sleep) keep a real zero.
    pub fn normalized(self) -> Self {
        fn int(v: Option<i32>) -> Option<i32> {
            v.filter(|v| *v != 0)
        }
        fn float(v: Option<f64>) -> Option<f64> {
            v.filter(|v| v.is_finite() && *v != 0.0)
        }
        fn finite(v: Option<f64>) -> Option<f64> {
            v.filter(|v| v.is_finite())
        }
        fn text(v: Option<String>) -> Option<String> {
            v.filter(|s| !s.trim().is_empty())
        }

        Self {
            name: text(self.name),
            phone_number: text(self.phone_number),
            heart_rate: int(self.heart_rate),
            prq: float(self.prq),
            oxygen_saturation: int(self.oxygen_saturation),
            blood_pressure: text(self.blood_pressure),
            blood_pressure_systolic: int(self.blood_pressure_systolic),
            blood_pressure_diastolic: int(self.blood_pressure_diastolic),
            breathing_rate: float(self.breathing_rate),
            respiratory_rate: int(self.respiratory_rate),
            temperature: float(self.temperature),
            heart_rate_conf_level: int(self.heart_rate_conf_level),
            breathing_rate_conf_level: int(self.breathing_rate_conf_level),
            prq_conf_level: int(self.prq_conf_level),
            hrv_sdnn_conf_level: int(self.hrv_sdnn_conf_level),
            stress_level: float(self.stress_level),
            recovery_ability: text(self.recovery_ability),
            stress_response: text(self.stress_response),
            respiration: float(self.respiration),
            hrv_sdnn: float(self.hrv_sdnn),
            pns_index: float(self.pns_index),
            sns_index: float(self.sns_index),
            sd1: float(self.sd1),
            sd2: float(self.sd2),
            rmssd: float(self.rmssd),
            mean_rri: float(self.mean_rri),
            lf_hf: float(self.lf_hf),
            diabetic_risk: text(self.diabetic_risk),
            hypertension_risk: text(self.hypertension_risk),
            high_fasting_glucose_risk: text(self.high_fasting_glucose_risk),
            high_total_cholesterol_risk: text(self.high_total_cholesterol_risk),
            low_hemoglobin_risk: text(self.low_hemoglobin_risk),
            ascvd_risk: text(self.ascvd_risk),
            heart_age: text(self.heart_age),
            hemoglobin: float(self.hemoglobin),
            hba1c: float(self.hba1c),
            blood_glucose: float(self.blood_glucose),
            cholesterol_total: float(self.cholesterol_total),
            cholesterol_ldl: float(self.cholesterol_ldl),
            cholesterol_hdl: float(self.cholesterol_hdl),
            triglycerides: float(self.triglycerides),
            bmi: float(self.bmi),
            weight: float(self.weight),
            pain_level: self.pain_level,
            steps_count: self.steps_count,
            calories_burned: finite(self.calories_burned),
            sleep_hours: finite(self.sleep_hours),
            sleep_quality: text(self.sleep_quality),
            notes: text(self.notes),
            symptoms: text(self.symptoms),
        }
    }

    /// The fields that have web-entry range rules, for validation.
    pub fn range_checked_fields(&self) -> VitalsEntry {
        VitalsEntry {
            blood_pressure_systolic: self.blood_pressure_systolic,
            blood_pressure_diastolic: self.blood_pressure_diastolic,
            heart_rate: self.heart_rate,
            respiratory_rate: self.respiratory_rate,
            temperature: self.temperature,
            oxygen_saturation: self.oxygen_saturation,
            blood_glucose: self.blood_glucose,
            cholesterol_total: self.cholesterol_total,
            cholesterol_ldl: self.cholesterol_ldl,
            cholesterol_hdl: self.cholesterol_hdl,
            triglycerides: self.triglycerides,
            bmi: self.bmi,
            weight: self.weight,
            pain_level: self.pain_level,
            steps_count: self.steps_count,
            calories_burned: self.calories_burned,
            sleep_hours: self.sleep_hours,
            sleep_quality: self.sleep_quality.clone(),
            notes: None,
            symptoms: None,
            recorded_at: None,
        }
    }
}

/// A row from the `vitals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Vitals {
    pub id: DbId,
    pub patient_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub face_scan_id: Option<DbId>,
    pub source: String,
    pub recorded_by: Option<String>,
    pub recorded_at: Timestamp,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub reading: VitalsReading,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Vitals {
    /// Stored blood pressure string, or one rebuilt from the components.
    pub fn blood_pressure_display(&self) -> Option<String> {
        self.reading.blood_pressure.clone().or_else(|| {
            healthvitals_core::vitals::format_blood_pressure(
                self.reading.blood_pressure_systolic,
                self.reading.blood_pressure_diastolic,
            )
        })
    }
}

impl From<&Vitals> for VitalsSnapshot {
    fn from(v: &Vitals) -> Self {
        let r = &v.reading;
        let int = |x: Option<i32>| x.map(f64::from);
        Self {
            recorded_at: v.recorded_at,
            blood_pressure_systolic: int(r.blood_pressure_systolic),
            blood_pressure_diastolic: int(r.blood_pressure_diastolic),
            heart_rate: int(r.heart_rate),
            respiratory_rate: int(r.respiratory_rate),
            temperature: r.temperature,
            oxygen_saturation: int(r.oxygen_saturation),
            blood_glucose: r.blood_glucose,
            cholesterol_total: r.cholesterol_total,
            bmi: r.bmi,
            weight: r.weight,
            pain_level: int(r.pain_level),
            steps_count: int(r.steps_count),
            calories_burned: r.calories_burned,
            sleep_hours: r.sleep_hours,
            sleep_quality: r.sleep_quality.clone(),
            hrv_sdnn: r.hrv_sdnn,
            stress_level: r.stress_level,
            notes: r.notes.clone(),
            symptoms: r.symptoms.clone(),
        }
    }
}

/// A vitals row joined with its owner and patient, for admin and device
/// listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VitalsWithOwner {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub vitals: Vitals,
    pub owner_email: Option<String>,
    pub owner_name: Option<String>,
    pub patient_first_name: Option<String>,
    pub patient_last_name: Option<String>,
}

/// DTO for inserting a vitals record.
#[derive(Debug, Clone)]
pub struct CreateVitals {
    pub patient_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub face_scan_id: Option<DbId>,
    pub source: String,
    pub recorded_by: Option<String>,
    /// Defaults to now when `None`.
    pub recorded_at: Option<Timestamp>,
    pub reading: VitalsReading,
}

impl Default for CreateVitals {
    fn default() -> Self {
        Self {
            patient_id: None,
            user_id: None,
            face_scan_id: None,
            source: SOURCE_WEB.to_string(),
            recorded_by: None,
            recorded_at: None,
            reading: VitalsReading::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_columns_match_struct_fields() {
        let value = serde_json::to_value(VitalsReading::default()).unwrap();
        let fields = value.as_object().unwrap();
        assert_eq!(fields.len(), READING_COLUMNS.len());
        for column in READING_COLUMNS {
            assert!(fields.contains_key(*column), "missing field {column}");
        }
    }

    #[test]
    fn entry_conversion_builds_blood_pressure_string() {
        let entry = VitalsEntry {
            blood_pressure_systolic: Some(118),
            blood_pressure_diastolic: Some(76),
            heart_rate: Some(64),
            ..Default::default()
        };
        let reading = VitalsReading::from(entry);
        assert_eq!(reading.blood_pressure.as_deref(), Some("118/76"));
        assert_eq!(reading.heart_rate, Some(64));
    }

    #[test]
    fn normalization_clears_unmeasured_values() {
        let reading = VitalsReading {
            heart_rate: Some(0),
            oxygen_saturation: Some(97),
            temperature: Some(f64::NAN),
            hrv_sdnn: Some(0.0),
            rmssd: Some(31.5),
            pain_level: Some(0),
            steps_count: Some(0),
            notes: Some("   ".into()),
            name: Some("Walk-in".into()),
            ..Default::default()
        }
        .normalized();

        assert_eq!(reading.heart_rate, None);
        assert_eq!(reading.oxygen_saturation, Some(97));
        assert_eq!(reading.temperature, None);
        assert_eq!(reading.hrv_sdnn, None);
        assert_eq!(reading.rmssd, Some(31.5));
        assert_eq!(reading.pain_level, Some(0));
        assert_eq!(reading.steps_count, Some(0));
        assert_eq!(reading.notes, None);
        assert_eq!(reading.name.as_deref(), Some("Walk-in"));
    }

    #[test]
    fn range_check_uses_entry_rules() {
        use validator::Validate;

        let ok = VitalsReading {
            heart_rate: Some(70),
            rmssd: Some(4000.0),
            ..Default::default()
        };
        assert!(ok.range_checked_fields().validate().is_ok());

        let too_fast = VitalsReading {
            heart_rate: Some(400),
            ..Default::default()
        };
        let errors = too_fast.range_checked_fields().validate().unwrap_err();
        assert!(errors.field_errors().contains_key("heart_rate"));
    }

    #[test]
    fn partial_device_payload_deserializes() {
        let reading: VitalsReading =
            serde_json::from_value(serde_json::json!({"heart_rate": 70, "rmssd": 31.5})).unwrap();
        assert_eq!(reading.heart_rate, Some(70));
        assert_eq!(reading.rmssd, Some(31.5));
        assert_eq!(reading.bmi, None);
    }
}
