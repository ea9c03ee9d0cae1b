//! Vital-sign snapshot shared by analytics, health scoring and exports,
//! plus the validated web entry payload.

use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Recorded through the web dashboard.
pub const SOURCE_WEB: &str = "web";
/// Submitted by the mobile scanning app.
pub const SOURCE_MOBILE: &str = "mobile";
/// Pushed by a paired scanning device.
pub const SOURCE_DEVICE: &str = "device";

pub const ALL_SOURCES: &[&str] = &[SOURCE_WEB, SOURCE_MOBILE, SOURCE_DEVICE];

/// Accepted values for `sleep_quality`.
pub const SLEEP_QUALITIES: &[&str] = &["Poor", "Fair", "Good", "Excellent"];

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Database-free view of one vitals record.
///
/// Integer columns are widened to `f64` so every statistic can be computed
/// the same way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VitalsSnapshot {
    pub recorded_at: Timestamp,
    pub blood_pressure_systolic: Option<f64>,
    pub blood_pressure_diastolic: Option<f64>,
    pub heart_rate: Option<f64>,
    pub respiratory_rate: Option<f64>,
    pub temperature: Option<f64>,
    pub oxygen_saturation: Option<f64>,
    pub blood_glucose: Option<f64>,
    pub cholesterol_total: Option<f64>,
    pub bmi: Option<f64>,
    pub weight: Option<f64>,
    pub pain_level: Option<f64>,
    pub steps_count: Option<f64>,
    pub calories_burned: Option<f64>,
    pub sleep_hours: Option<f64>,
    pub sleep_quality: Option<String>,
    pub hrv_sdnn: Option<f64>,
    pub stress_level: Option<f64>,
    pub notes: Option<String>,
    pub symptoms: Option<String>,
}

/// Numeric fields that analytics can aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Metric {
    Systolic,
    Diastolic,
    HeartRate,
    RespiratoryRate,
    Temperature,
    OxygenSaturation,
    BloodGlucose,
    CholesterolTotal,
    Bmi,
    PainLevel,
    StepsCount,
    CaloriesBurned,
    SleepHours,
}

/// Metrics reported in the analytics summary, in output order.
pub const SUMMARY_METRICS: &[Metric] = &[
    Metric::Systolic,
    Metric::Diastolic,
    Metric::HeartRate,
    Metric::RespiratoryRate,
    Metric::Temperature,
    Metric::OxygenSaturation,
    Metric::BloodGlucose,
    Metric::CholesterolTotal,
    Metric::Bmi,
    Metric::StepsCount,
    Metric::CaloriesBurned,
    Metric::SleepHours,
];

/// Metrics compared between the latest and previous readings.
pub const CHANGE_METRICS: &[Metric] = &[
    Metric::Systolic,
    Metric::Diastolic,
    Metric::HeartRate,
    Metric::RespiratoryRate,
    Metric::Temperature,
    Metric::OxygenSaturation,
    Metric::BloodGlucose,
    Metric::CholesterolTotal,
    Metric::Bmi,
    Metric::PainLevel,
];

impl Metric {
    /// JSON key used in API responses.
    pub fn key(self) -> &'static str {
        match self {
            Self::Systolic => "blood_pressure_systolic",
            Self::Diastolic => "blood_pressure_diastolic",
            Self::HeartRate => "heart_rate",
            Self::RespiratoryRate => "respiratory_rate",
            Self::Temperature => "temperature",
            Self::OxygenSaturation => "oxygen_saturation",
            Self::BloodGlucose => "blood_glucose",
            Self::CholesterolTotal => "cholesterol_total",
            Self::Bmi => "bmi",
            Self::PainLevel => "pain_level",
            Self::StepsCount => "steps_count",
            Self::CaloriesBurned => "calories_burned",
            Self::SleepHours => "sleep_hours",
        }
    }

    pub fn value(self, snapshot: &VitalsSnapshot) -> Option<f64> {
        match self {
            Self::Systolic => snapshot.blood_pressure_systolic,
            Self::Diastolic => snapshot.blood_pressure_diastolic,
            Self::HeartRate => snapshot.heart_rate,
            Self::RespiratoryRate => snapshot.respiratory_rate,
            Self::Temperature => snapshot.temperature,
            Self::OxygenSaturation => snapshot.oxygen_saturation,
            Self::BloodGlucose => snapshot.blood_glucose,
            Self::CholesterolTotal => snapshot.cholesterol_total,
            Self::Bmi => snapshot.bmi,
            Self::PainLevel => snapshot.pain_level,
            Self::StepsCount => snapshot.steps_count,
            Self::CaloriesBurned => snapshot.calories_burned,
            Self::SleepHours => snapshot.sleep_hours,
        }
    }
}

// ---------------------------------------------------------------------------
// Blood pressure strings
// ---------------------------------------------------------------------------

/// Parse a `"120/80"` style reading into `(systolic, diastolic)`.
///
/// Returns `None` unless both halves are integers.
pub fn parse_blood_pressure(value: &str) -> Option<(i32, i32)> {
    let (sys, dia) = value.split_once('/')?;
    let systolic = sys.trim().parse().ok()?;
    let diastolic = dia.trim().parse().ok()?;
    Some((systolic, diastolic))
}

/// Render systolic/diastolic as `"120/80"` when both are present.
pub fn format_blood_pressure(systolic: Option<i32>, diastolic: Option<i32>) -> Option<String> {
    match (systolic, diastolic) {
        (Some(s), Some(d)) => Some(format!("{s}/{d}")),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Web entry
// ---------------------------------------------------------------------------

/// Vitals submitted from the web dashboard.
///
/// Every field is optional; the ranges reject physiologically impossible
/// values rather than merely unusual ones.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct VitalsEntry {
    #[validate(range(min = 60, max = 250))]
    pub blood_pressure_systolic: Option<i32>,
    #[validate(range(min = 40, max = 150))]
    pub blood_pressure_diastolic: Option<i32>,
    #[validate(range(min = 30, max = 250))]
    pub heart_rate: Option<i32>,
    #[validate(range(min = 5, max = 60))]
    pub respiratory_rate: Option<i32>,
    #[validate(range(min = 35.0, max = 42.0))]
    pub temperature: Option<f64>,
    #[validate(range(min = 50, max = 100))]
    pub oxygen_saturation: Option<i32>,
    #[validate(range(exclusive_min = 0.0))]
    pub blood_glucose: Option<f64>,
    #[validate(range(exclusive_min = 0.0))]
    pub cholesterol_total: Option<f64>,
    #[validate(range(exclusive_min = 0.0))]
    pub cholesterol_ldl: Option<f64>,
    #[validate(range(exclusive_min = 0.0))]
    pub cholesterol_hdl: Option<f64>,
    #[validate(range(exclusive_min = 0.0))]
    pub triglycerides: Option<f64>,
    #[validate(range(exclusive_min = 0.0))]
    pub bmi: Option<f64>,
    #[validate(range(exclusive_min = 0.0))]
    pub weight: Option<f64>,
    #[validate(range(min = 0, max = 10))]
    pub pain_level: Option<i32>,
    #[validate(range(min = 0))]
    pub steps_count: Option<i32>,
    #[validate(range(min = 0.0))]
    pub calories_burned: Option<f64>,
    #[validate(range(min = 0.0, max = 24.0))]
    pub sleep_hours: Option<f64>,
    #[validate(custom(function = "validate_sleep_quality"))]
    pub sleep_quality: Option<String>,
    pub notes: Option<String>,
    pub symptoms: Option<String>,
    /// Optional explicit measurement time; defaults to now.
    pub recorded_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Scan biometrics
// ---------------------------------------------------------------------------

/// Subject biometrics a scan may carry. Checked before they reach the
/// profile or patient record.
#[derive(Debug, Clone, Default, Validate)]
pub struct ScanBiometrics {
    #[validate(range(min = 0, max = 150))]
    pub age: Option<i32>,
    /// Centimetres.
    #[validate(range(min = 30.0, max = 300.0))]
    pub height: Option<f64>,
    /// Kilograms.
    #[validate(range(min = 1.0, max = 700.0))]
    pub weight: Option<f64>,
}

fn validate_sleep_quality(value: &str) -> Result<(), ValidationError> {
    if SLEEP_QUALITIES.contains(&value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("sleep_quality");
        err.message = Some("must be one of Poor, Fair, Good, Excellent".into());
        Err(err)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
