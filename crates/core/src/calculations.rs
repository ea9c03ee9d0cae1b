//! Small biometric and formatting helpers shared by the profile, vitals and
//! export code paths.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Unit systems
// ---------------------------------------------------------------------------

/// Measurement system a user prefers (stored in `user_settings.unit_system`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "metric" => Ok(Self::Metric),
            "imperial" => Ok(Self::Imperial),
            other => Err(CoreError::Validation(format!(
                "Unknown unit system '{other}', expected 'metric' or 'imperial'"
            ))),
        }
    }
}

/// Kind of quantity passed to [`convert_units`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    Weight,
    Height,
    Temperature,
}

// ---------------------------------------------------------------------------
// BMI
// ---------------------------------------------------------------------------

/// BMI classification bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BmiCategory {
    #[serde(rename = "Underweight")]
    Underweight,
    #[serde(rename = "Normal weight")]
    Normal,
    #[serde(rename = "Overweight")]
    Overweight,
    #[serde(rename = "Obese")]
    Obese,
}

impl BmiCategory {
    pub fn from_value(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 25.0 {
            Self::Normal
        } else if bmi < 30.0 {
            Self::Overweight
        } else {
            Self::Obese
        }
    }
}

/// A BMI value rounded to one decimal place together with its category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bmi {
    pub value: f64,
    pub category: BmiCategory,
}

/// Compute BMI from weight and height in the given unit system.
///
/// Metric expects kg and cm; imperial expects lb and inches. Returns `None`
/// when either input is missing or not positive.
pub fn calculate_bmi(weight: Option<f64>, height: Option<f64>, units: UnitSystem) -> Option<Bmi> {
    let (weight, height) = (weight?, height?);
    if weight <= 0.0 || height <= 0.0 {
        return None;
    }

    let raw = match units {
        UnitSystem::Metric => {
            let meters = height / 100.0;
            weight / (meters * meters)
        }
        UnitSystem::Imperial => weight * 703.0 / (height * height),
    };
    let value = round_to(raw, 1);

    Some(Bmi {
        value,
        category: BmiCategory::from_value(value),
    })
}

/// BMI from kg / cm rounded to two decimals, as stored on a vitals row.
pub fn bmi_from_metric(weight_kg: Option<f64>, height_cm: Option<f64>) -> Option<f64> {
    let (weight, height) = (weight_kg?, height_cm?);
    if weight <= 0.0 || height <= 0.0 {
        return None;
    }
    let meters = height / 100.0;
    Some(round_to(weight / (meters * meters), 2))
}

// ---------------------------------------------------------------------------
// Age
// ---------------------------------------------------------------------------

/// Whole years between `date_of_birth` and `today`.
pub fn calculate_age(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age
}

/// January 1st of the year someone of `age` was born, relative to `today`.
///
/// Devices only report an age, so the profile stores this approximation.
/// `None` for negative ages or years chrono cannot represent.
pub fn approximate_birth_date(age: i32, today: NaiveDate) -> Option<NaiveDate> {
    if age < 0 {
        return None;
    }
    NaiveDate::from_ymd_opt(today.year().checked_sub(age)?, 1, 1)
}

// ---------------------------------------------------------------------------
// Date formatting
// ---------------------------------------------------------------------------

/// Date display formats offered in user settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    MonthDayYear,
    DayMonthYear,
    Iso,
}

impl DateFormat {
    /// Parse a settings value. Unknown strings fall back to `MM/DD/YYYY`.
    pub fn parse(value: &str) -> Self {
        match value {
            "DD/MM/YYYY" => Self::DayMonthYear,
            "YYYY-MM-DD" => Self::Iso,
            _ => Self::MonthDayYear,
        }
    }
}

pub fn format_date(date: NaiveDate, format: DateFormat) -> String {
    match format {
        DateFormat::MonthDayYear => date.format("%m/%d/%Y").to_string(),
        DateFormat::DayMonthYear => date.format("%d/%m/%Y").to_string(),
        DateFormat::Iso => date.format("%Y-%m-%d").to_string(),
    }
}

// ---------------------------------------------------------------------------
// Unit conversion
// ---------------------------------------------------------------------------

const LB_PER_KG: f64 = 2.20462;
const CM_PER_INCH: f64 = 2.54;

/// Convert a value between unit systems, rounded to one decimal place.
pub fn convert_units(value: f64, from: UnitSystem, to: UnitSystem, quantity: Quantity) -> f64 {
    if from == to {
        return value;
    }

    let converted = match (quantity, from) {
        (Quantity::Weight, UnitSystem::Metric) => value * LB_PER_KG,
        (Quantity::Weight, UnitSystem::Imperial) => value / LB_PER_KG,
        (Quantity::Height, UnitSystem::Metric) => value / CM_PER_INCH,
        (Quantity::Height, UnitSystem::Imperial) => value * CM_PER_INCH,
        (Quantity::Temperature, UnitSystem::Metric) => value * 9.0 / 5.0 + 32.0,
        (Quantity::Temperature, UnitSystem::Imperial) => (value - 32.0) * 5.0 / 9.0,
    };
    round_to(converted, 1)
}

// ---------------------------------------------------------------------------
// Misc
// ---------------------------------------------------------------------------

/// Upper-case initials for an avatar placeholder, `"?"` when both are empty.
pub fn initials(first_name: Option<&str>, last_name: Option<&str>) -> String {
    let first_char = |s: Option<&str>| {
        s.and_then(|s| s.chars().next())
            .map(|c| c.to_uppercase().collect::<String>())
            .unwrap_or_default()
    };
    let result = first_char(first_name) + &first_char(last_name);
    if result.is_empty() {
        "?".to_string()
    } else {
        result
    }
}

/// Round `value` to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn metric_bmi_is_rounded_and_categorised() {
        let bmi = calculate_bmi(Some(70.0), Some(175.0), UnitSystem::Metric).unwrap();
        assert_eq!(bmi.value, 22.9);
        assert_eq!(bmi.category, BmiCategory::Normal);
    }

    #[test]
    fn imperial_bmi_uses_703_factor() {
        let bmi = calculate_bmi(Some(200.0), Some(70.0), UnitSystem::Imperial).unwrap();
        assert_eq!(bmi.value, 28.7);
        assert_eq!(bmi.category, BmiCategory::Overweight);
    }

    #[test]
    fn bmi_requires_positive_inputs() {
        assert!(calculate_bmi(None, Some(170.0), UnitSystem::Metric).is_none());
        assert!(calculate_bmi(Some(70.0), Some(0.0), UnitSystem::Metric).is_none());
        assert!(bmi_from_metric(Some(-1.0), Some(170.0)).is_none());
    }

    #[test]
    fn bmi_category_boundaries() {
        assert_eq!(BmiCategory::from_value(18.4), BmiCategory::Underweight);
        assert_eq!(BmiCategory::from_value(18.5), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_value(25.0), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_value(30.0), BmiCategory::Obese);
    }

    #[test]
    fn stored_bmi_keeps_two_decimals() {
        assert_eq!(bmi_from_metric(Some(70.0), Some(175.0)), Some(22.86));
    }

    #[test]
    fn age_before_and_after_birthday() {
        let dob = date(1990, 5, 15);
        assert_eq!(calculate_age(dob, date(2024, 5, 14)), 33);
        assert_eq!(calculate_age(dob, date(2024, 5, 15)), 34);
        assert_eq!(calculate_age(dob, date(2024, 12, 1)), 34);
    }

    #[test]
    fn approximate_birth_date_is_new_year() {
        assert_eq!(
            approximate_birth_date(30, date(2024, 8, 1)),
            Some(date(1994, 1, 1))
        );
    }

    #[test]
    fn approximate_birth_date_rejects_impossible_ages() {
        let today = date(2026, 10, 18);
        assert_eq!(approximate_birth_date(-5, today), None);
        assert_eq!(approximate_birth_date(-2_147_483_000, today), None);
        assert_eq!(approximate_birth_date(i32::MAX, today), None);
        assert_eq!(approximate_birth_date(0, today), Some(date(2026, 1, 1)));
    }

    #[test]
    fn date_formats() {
        let d = date(2024, 3, 7);
        assert_eq!(format_date(d, DateFormat::MonthDayYear), "03/07/2024");
        assert_eq!(format_date(d, DateFormat::DayMonthYear), "07/03/2024");
        assert_eq!(format_date(d, DateFormat::Iso), "2024-03-07");
        assert_eq!(DateFormat::parse("bogus"), DateFormat::MonthDayYear);
    }

    #[test]
    fn unit_conversion_round_trips_approximately() {
        let lb = convert_units(70.0, UnitSystem::Metric, UnitSystem::Imperial, Quantity::Weight);
        assert_eq!(lb, 154.3);
        let f = convert_units(37.0, UnitSystem::Metric, UnitSystem::Imperial, Quantity::Temperature);
        assert_eq!(f, 98.6);
        let cm = convert_units(70.0, UnitSystem::Imperial, UnitSystem::Metric, Quantity::Height);
        assert_eq!(cm, 177.8);
        assert_eq!(
            convert_units(12.3, UnitSystem::Metric, UnitSystem::Metric, Quantity::Height),
            12.3
        );
    }

    #[test]
    fn unit_system_parse() {
        assert_eq!(UnitSystem::parse("imperial").unwrap(), UnitSystem::Imperial);
        assert!(UnitSystem::parse("cubits").is_err());
    }

    #[test]
    fn initials_fallback() {
        assert_eq!(initials(Some("jane"), Some("doe")), "JD");
        assert_eq!(initials(Some("jane"), None), "J");
        assert_eq!(initials(None, Some("")), "?");
    }
}
