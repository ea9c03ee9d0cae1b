//! Health score and status classification for a single reading.

use serde::Serialize;

use crate::vitals::VitalsSnapshot;

/// Score a reading out of 100 by subtracting fixed penalties.
///
/// `None` (no reading yet) scores 0. Absent fields carry no penalty.
pub fn health_score(latest: Option<&VitalsSnapshot>) -> u32 {
    let Some(v) = latest else {
        return 0;
    };

    let mut penalty = 0u32;

    if let Some(systolic) = present(v.blood_pressure_systolic) {
        penalty += match systolic {
            s if s > 140.0 => 15,
            s if s > 130.0 => 10,
            s if s > 120.0 => 5,
            _ => 0,
        };
    }

    if let Some(hr) = present(v.heart_rate) {
        if hr > 100.0 || hr < 60.0 {
            penalty += 10;
        }
    }

    if let Some(spo2) = present(v.oxygen_saturation) {
        penalty += match spo2 {
            s if s < 95.0 => 15,
            s if s < 98.0 => 5,
            _ => 0,
        };
    }

    if let Some(bmi) = present(v.bmi) {
        penalty += match bmi {
            b if b > 30.0 || b < 18.5 => 10,
            b if b > 25.0 => 5,
            _ => 0,
        };
    }

    if let Some(glucose) = present(v.blood_glucose) {
        penalty += match glucose {
            g if g > 140.0 => 10,
            g if g > 100.0 => 5,
            _ => 0,
        };
    }

    100u32.saturating_sub(penalty)
}

/// Zero counts as "not measured".
fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Normal,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub status: StatusLevel,
    pub warnings: Vec<&'static str>,
    pub critical: Vec<&'static str>,
    pub summary: &'static str,
}

/// Classify a reading. A value may produce both a warning and a critical
/// finding (e.g. systolic 190 is both "high" and "critical").
pub fn assess(v: &VitalsSnapshot) -> HealthStatus {
    let mut warnings = Vec::new();
    let mut critical = Vec::new();

    if let Some(s) = present(v.blood_pressure_systolic) {
        if s > 140.0 {
            warnings.push("High blood pressure");
        }
        if s > 180.0 {
            critical.push("Critical blood pressure");
        }
        if s < 90.0 {
            warnings.push("Low blood pressure");
        }
    }

    if let Some(hr) = present(v.heart_rate) {
        if hr > 100.0 {
            warnings.push("Elevated heart rate");
        }
        if hr < 60.0 {
            warnings.push("Low heart rate");
        }
    }

    if let Some(spo2) = present(v.oxygen_saturation) {
        if spo2 < 95.0 {
            warnings.push("Low oxygen saturation");
        }
        if spo2 < 90.0 {
            critical.push("Critical oxygen levels");
        }
    }

    if let Some(t) = present(v.temperature) {
        if t > 37.5 {
            warnings.push("Elevated temperature");
        }
        if t > 39.0 {
            critical.push("High fever");
        }
    }

    if let Some(g) = present(v.blood_glucose) {
        if g > 140.0 {
            warnings.push("High blood glucose");
        }
        if g > 200.0 {
            critical.push("Very high blood glucose");
        }
        if g < 70.0 {
            warnings.push("Low blood glucose");
        }
    }

    let (status, summary) = if !critical.is_empty() {
        (StatusLevel::Critical, "Immediate medical attention recommended")
    } else if !warnings.is_empty() {
        (StatusLevel::Warning, "Some values need attention")
    } else {
        (StatusLevel::Normal, "All vitals within normal range")
    };

    HealthStatus {
        status,
        warnings,
        critical,
        summary,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
