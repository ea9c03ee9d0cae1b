//! Arithmetic behind the dashboard overview: look-back windows, recent
//! averages, week-over-week activity and risk label tallies.

use chrono::Duration;
use serde::Serialize;

use crate::types::{start_of_day, Timestamp};
use crate::vitals::VitalsSnapshot;

/// Most recent readings considered for the averages.
pub const AVERAGE_SAMPLE_LIMIT: i64 = 100;

/// Day boundaries the overview counts against, all in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Windows {
    pub today: Timestamp,
    pub week_start: Timestamp,
    pub previous_week_start: Timestamp,
    pub month_start: Timestamp,
}

impl Windows {
    pub fn ending(now: Timestamp) -> Self {
        let today = start_of_day(now.date_naive());
        let week_start = today - Duration::days(7);
        Self {
            today,
            week_start,
            previous_week_start: week_start - Duration::days(7),
            month_start: today - Duration::days(30),
        }
    }
}

/// Averages over the recent sample. `None` when nothing was measured.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricAverages {
    pub heart_rate: Option<i64>,
    pub oxygen_saturation: Option<i64>,
    /// `"systolic/diastolic"` over readings that carry both halves.
    pub blood_pressure: Option<String>,
    /// One decimal place.
    pub hrv_sdnn: Option<f64>,
    /// Stress as a 0-100 percentage.
    pub stress_level: Option<i64>,
}

/// Averages, ignoring absent and zero fields.
pub fn averages(readings: &[VitalsSnapshot]) -> MetricAverages {
    let mean = |pick: fn(&VitalsSnapshot) -> Option<f64>| {
        let values: Vec<f64> = readings
            .iter()
            .filter_map(pick)
            .filter(|v| *v != 0.0 && v.is_finite())
            .collect();
        (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
    };

    let pressure: Vec<(f64, f64)> = readings
        .iter()
        .filter_map(|r| Some((r.blood_pressure_systolic?, r.blood_pressure_diastolic?)))
        .filter(|(s, d)| *s != 0.0 && *d != 0.0)
        .collect();
    let blood_pressure = (!pressure.is_empty()).then(|| {
        let n = pressure.len() as f64;
        let systolic = pressure.iter().map(|p| p.0).sum::<f64>() / n;
        let diastolic = pressure.iter().map(|p| p.1).sum::<f64>() / n;
        format!("{}/{}", systolic.round() as i64, diastolic.round() as i64)
    });

    MetricAverages {
        heart_rate: mean(|r| r.heart_rate).map(|v| v.round() as i64),
        oxygen_saturation: mean(|r| r.oxygen_saturation).map(|v| v.round() as i64),
        blood_pressure,
        hrv_sdnn: mean(|r| r.hrv_sdnn).map(|v| (v * 10.0).round() / 10.0),
        stress_level: mean(|r| r.stress_level).map(|v| (v * 100.0).round() as i64),
    }
}

/// Percentage change from the previous week's count, one decimal place.
/// Zero when there is nothing to compare against.
pub fn weekly_trend(current: i64, previous: i64) -> f64 {
    if previous <= 0 {
        return 0.0;
    }
    let pct = (current - previous) as f64 / previous as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

/// Count of readings per risk label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RiskTally {
    pub low: i64,
    pub medium: i64,
    pub high: i64,
}

impl RiskTally {
    /// Add `count` readings labelled `label`. Labels match case-insensitively;
    /// anything else is ignored.
    pub fn add(&mut self, label: &str, count: i64) {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => self.low += count,
            "medium" => self.medium += count,
            "high" => self.high += count,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn reading(hr: Option<f64>, bp: Option<(f64, f64)>, stress: Option<f64>) -> VitalsSnapshot {
        VitalsSnapshot {
            recorded_at: Utc::now(),
            heart_rate: hr,
            blood_pressure_systolic: bp.map(|b| b.0),
            blood_pressure_diastolic: bp.map(|b| b.1),
            stress_level: stress,
            ..Default::default()
        }
    }

    #[test]
    fn windows_start_at_utc_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 17, 45, 0).unwrap();
        let w = Windows::ending(now);
        assert_eq!(w.today.to_rfc3339(), "2024-06-15T00:00:00+00:00");
        assert_eq!(w.week_start.to_rfc3339(), "2024-06-08T00:00:00+00:00");
        assert_eq!(w.previous_week_start.to_rfc3339(), "2024-06-01T00:00:00+00:00");
        assert_eq!(w.month_start.to_rfc3339(), "2024-05-16T00:00:00+00:00");
    }

    #[test]
    fn averages_skip_unmeasured_values() {
        let readings = [
            reading(Some(70.0), Some((120.0, 80.0)), Some(0.25)),
            reading(Some(0.0), Some((130.0, 0.0)), None),
            reading(Some(81.0), Some((125.0, 85.0)), Some(0.5)),
        ];
        let avg = averages(&readings);
        assert_eq!(avg.heart_rate, Some(76));
        assert_eq!(avg.blood_pressure.as_deref(), Some("123/83"));
        assert_eq!(avg.stress_level, Some(38));
        assert_eq!(avg.oxygen_saturation, None);
        assert_eq!(avg.hrv_sdnn, None);
    }

    #[test]
    fn no_readings_means_no_averages() {
        assert_eq!(averages(&[]), MetricAverages::default());
    }

    #[test]
    fn weekly_trend_percentages() {
        assert_eq!(weekly_trend(15, 10), 50.0);
        assert_eq!(weekly_trend(2, 3), -33.3);
        assert_eq!(weekly_trend(4, 0), 0.0);
    }

    #[test]
    fn risk_tally_ignores_unknown_labels() {
        let mut tally = RiskTally::default();
        tally.add("High", 2);
        tally.add("low", 1);
        tally.add(" MEDIUM ", 3);
        tally.add("unknown", 9);
        assert_eq!(tally, RiskTally { low: 1, medium: 3, high: 2 });
    }
}
