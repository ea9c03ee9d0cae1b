//! Aggregate statistics over a period of vitals readings.
//!
//! All functions expect readings in ascending `recorded_at` order and are
//! pure: the caller loads the range, this module does the arithmetic.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, Months};
use serde::Serialize;

use crate::health::health_score;
use crate::types::Timestamp;
use crate::vitals::{Metric, VitalsSnapshot, CHANGE_METRICS, SUMMARY_METRICS};

/// Minimum number of paired observations before a correlation is reported.
pub const MIN_CORRELATION_PAIRS: usize = 6;

/// Percentage change that separates a trend from noise.
pub const TREND_THRESHOLD_PCT: f64 = 5.0;

// ---------------------------------------------------------------------------
// Period
// ---------------------------------------------------------------------------

/// Look-back window for analytics and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    SevenDays,
    #[default]
    ThirtyDays,
    NinetyDays,
    OneYear,
}

impl Period {
    /// Parse a query value. Anything unrecognised falls back to 30 days.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("7d") => Self::SevenDays,
            Some("90d") => Self::NinetyDays,
            Some("1y") => Self::OneYear,
            _ => Self::ThirtyDays,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SevenDays => "7d",
            Self::ThirtyDays => "30d",
            Self::NinetyDays => "90d",
            Self::OneYear => "1y",
        }
    }

    /// Start of the window ending at `end`.
    pub fn start_from(self, end: Timestamp) -> Timestamp {
        match self {
            Self::SevenDays => end - Duration::days(7),
            Self::ThirtyDays => end - Duration::days(30),
            Self::NinetyDays => end - Duration::days(90),
            Self::OneYear => end
                .checked_sub_months(Months::new(12))
                .unwrap_or(end - Duration::days(365)),
        }
    }
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    pub current: f64,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
    pub trend: Trend,
}

/// Compare the mean of the first three values with the mean of the last three.
///
/// Both means divide by `min(3, len)`, so short series compare the whole
/// series with itself and come out stable.
pub fn trend(values: &[f64]) -> Trend {
    if values.len() < 2 {
        return Trend::Stable;
    }

    let window = values.len().min(3);
    let previous: f64 = values[..window].iter().sum::<f64>() / window as f64;
    let recent: f64 = values[values.len() - window..].iter().sum::<f64>() / window as f64;

    if previous == 0.0 {
        return Trend::Stable;
    }

    let change = (recent - previous) / previous * 100.0;
    if change > TREND_THRESHOLD_PCT {
        Trend::Increasing
    } else if change < -TREND_THRESHOLD_PCT {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

fn summarize_values(values: &[f64]) -> Option<MetricSummary> {
    let current = *values.last()?;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(MetricSummary {
        current,
        average: values.iter().sum::<f64>() / values.len() as f64,
        min,
        max,
        count: values.len(),
        trend: trend(values),
    })
}

/// Per-metric summary keyed by the metric's JSON name. Metrics with no
/// recorded values are omitted.
pub fn summarize(readings: &[VitalsSnapshot]) -> BTreeMap<&'static str, MetricSummary> {
    SUMMARY_METRICS
        .iter()
        .filter_map(|&metric| {
            let values: Vec<f64> = readings.iter().filter_map(|r| metric.value(r)).collect();
            summarize_values(&values).map(|s| (metric.key(), s))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Trend series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BloodPressurePoint {
    pub date: String,
    pub systolic: f64,
    pub diastolic: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuePoint {
    pub date: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityPoint {
    pub date: String,
    pub steps: f64,
    pub calories: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrendSeries {
    pub blood_pressure: Vec<BloodPressurePoint>,
    pub heart_rate: Vec<ValuePoint>,
    pub oxygen_saturation: Vec<ValuePoint>,
    pub blood_glucose: Vec<ValuePoint>,
    pub weight: Vec<ValuePoint>,
    pub activity: Vec<ActivityPoint>,
}

fn day_key(ts: Timestamp) -> String {
    ts.format("%Y-%m-%d").to_string()
}

/// A present, non-zero value. Zero is treated as "not measured" for charts.
fn nonzero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

/// Chart-ready series, one point per reading that carries the metric.
pub fn trend_series(readings: &[VitalsSnapshot]) -> TrendSeries {
    let mut series = TrendSeries::default();

    for reading in readings {
        let date = day_key(reading.recorded_at);

        if let (Some(systolic), Some(diastolic)) = (
            nonzero(reading.blood_pressure_systolic),
            nonzero(reading.blood_pressure_diastolic),
        ) {
            series.blood_pressure.push(BloodPressurePoint {
                date: date.clone(),
                systolic,
                diastolic,
            });
        }

        let singles = [
            (&mut series.heart_rate, reading.heart_rate),
            (&mut series.oxygen_saturation, reading.oxygen_saturation),
            (&mut series.blood_glucose, reading.blood_glucose),
            (&mut series.weight, reading.weight),
        ];
        for (points, value) in singles {
            if let Some(value) = nonzero(value) {
                points.push(ValuePoint {
                    date: date.clone(),
                    value,
                });
            }
        }

        let steps = nonzero(reading.steps_count);
        let calories = nonzero(reading.calories_burned);
        if steps.is_some() || calories.is_some() {
            series.activity.push(ActivityPoint {
                date,
                steps: steps.unwrap_or(0.0),
                calories: calories.unwrap_or(0.0),
            });
        }
    }

    series
}

// ---------------------------------------------------------------------------
// Distributions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BloodPressureDistribution {
    pub normal: usize,
    pub elevated: usize,
    pub high1: usize,
    pub high2: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HeartRateZones {
    pub resting: usize,
    pub normal: usize,
    pub elevated: usize,
    pub high: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SleepQualityDistribution {
    pub poor: usize,
    pub fair: usize,
    pub good: usize,
    pub excellent: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Distributions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<BloodPressureDistribution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate_zones: Option<HeartRateZones>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_quality: Option<SleepQualityDistribution>,
}

pub fn distributions(readings: &[VitalsSnapshot]) -> Distributions {
    let systolic: Vec<f64> = readings
        .iter()
        .filter_map(|r| nonzero(r.blood_pressure_systolic))
        .collect();
    let heart_rates: Vec<f64> = readings.iter().filter_map(|r| nonzero(r.heart_rate)).collect();
    let sleep: Vec<&str> = readings
        .iter()
        .filter_map(|r| r.sleep_quality.as_deref())
        .filter(|q| !q.is_empty())
        .collect();

    let blood_pressure = (!systolic.is_empty()).then(|| {
        let mut d = BloodPressureDistribution::default();
        for &v in &systolic {
            match v {
                v if v < 120.0 => d.normal += 1,
                v if v < 130.0 => d.elevated += 1,
                v if v < 140.0 => d.high1 += 1,
                _ => d.high2 += 1,
            }
        }
        d
    });

    let heart_rate_zones = (!heart_rates.is_empty()).then(|| {
        let mut z = HeartRateZones::default();
        for &v in &heart_rates {
            match v {
                v if v < 60.0 => z.resting += 1,
                v if v < 100.0 => z.normal += 1,
                v if v < 140.0 => z.elevated += 1,
                _ => z.high += 1,
            }
        }
        z
    });

    let sleep_quality = (!sleep.is_empty()).then(|| {
        let mut s = SleepQualityDistribution::default();
        for q in &sleep {
            match *q {
                "Poor" => s.poor += 1,
                "Fair" => s.fair += 1,
                "Good" => s.good += 1,
                "Excellent" => s.excellent += 1,
                _ => {}
            }
        }
        s
    });

    Distributions {
        blood_pressure,
        heart_rate_zones,
        sleep_quality,
    }
}

// ---------------------------------------------------------------------------
// Correlations
// ---------------------------------------------------------------------------

/// Pearson correlation coefficient of two equally sized series.
///
/// Returns 0 when the denominator vanishes (either series is constant).
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len()) as f64;
    let (x, y) = (&x[..n as usize], &y[..n as usize]);

    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
    let sum_x2: f64 = x.iter().map(|a| a * a).sum();
    let sum_y2: f64 = y.iter().map(|b| b * b).sum();

    let numerator = n * sum_xy - sum_x * sum_y;
    let denominator = ((n * sum_x2 - sum_x * sum_x) * (n * sum_y2 - sum_y * sum_y)).sqrt();

    if denominator == 0.0 || denominator.is_nan() {
        0.0
    } else {
        numerator / denominator
    }
}

fn paired_correlation(
    readings: &[VitalsSnapshot],
    a: impl Fn(&VitalsSnapshot) -> Option<f64>,
    b: impl Fn(&VitalsSnapshot) -> Option<f64>,
) -> Option<f64> {
    let (xs, ys): (Vec<f64>, Vec<f64>) = readings
        .iter()
        .filter_map(|r| Some((nonzero(a(r))?, nonzero(b(r))?)))
        .unzip();

    (xs.len() >= MIN_CORRELATION_PAIRS).then(|| pearson(&xs, &ys))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Correlations {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_pressure_heart_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_sleep: Option<f64>,
}

pub fn correlations(readings: &[VitalsSnapshot]) -> Correlations {
    Correlations {
        blood_pressure_heart_rate: paired_correlation(
            readings,
            |r| r.blood_pressure_systolic,
            |r| r.heart_rate,
        ),
        activity_sleep: paired_correlation(readings, |r| r.steps_count, |r| r.sleep_hours),
    }
}

// ---------------------------------------------------------------------------
// Activity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActivityMetrics {
    pub total_steps: f64,
    pub total_calories: f64,
    pub average_daily_steps: f64,
    pub average_daily_calories: f64,
    pub days_with_activity: usize,
}

pub fn activity_metrics(readings: &[VitalsSnapshot]) -> ActivityMetrics {
    let active: Vec<&VitalsSnapshot> = readings
        .iter()
        .filter(|r| nonzero(r.steps_count).is_some() || nonzero(r.calories_burned).is_some())
        .collect();

    if active.is_empty() {
        return ActivityMetrics::default();
    }

    let total_steps: f64 = active.iter().filter_map(|r| r.steps_count).sum();
    let total_calories: f64 = active.iter().filter_map(|r| r.calories_burned).sum();
    let days: BTreeSet<String> = active.iter().map(|r| day_key(r.recorded_at)).collect();
    let day_count = days.len() as f64;

    ActivityMetrics {
        total_steps,
        total_calories,
        average_daily_steps: (total_steps / day_count).round(),
        average_daily_calories: (total_calories / day_count).round(),
        days_with_activity: days.len(),
    }
}

// ---------------------------------------------------------------------------
// Latest vs previous
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricChange {
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
    pub trend: Direction,
}

/// Per-field change from `previous` to `current` for fields present in both.
pub fn compare(
    current: &VitalsSnapshot,
    previous: &VitalsSnapshot,
) -> BTreeMap<&'static str, MetricChange> {
    CHANGE_METRICS
        .iter()
        .filter_map(|&metric| {
            let now = metric.value(current)?;
            let before = metric.value(previous)?;
            let direction = if now > before {
                Direction::Up
            } else if now < before {
                Direction::Down
            } else {
                Direction::Stable
            };
            let change = MetricChange {
                value: now - before,
                percentage: (before != 0.0).then(|| (now - before) / before * 100.0),
                trend: direction,
            };
            Some((metric.key(), change))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Full report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateRange {
    pub start: Timestamp,
    pub end: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub summary: BTreeMap<&'static str, MetricSummary>,
    pub trends: TrendSeries,
    pub distributions: Distributions,
    pub correlations: Correlations,
    pub health_score: u32,
    pub activity_metrics: ActivityMetrics,
    pub period: &'static str,
    pub total_records: usize,
    pub date_range: DateRange,
}

/// Build the full analytics payload for readings within `[start, end]`.
pub fn analyze(
    readings: &[VitalsSnapshot],
    period: Period,
    start: Timestamp,
    end: Timestamp,
) -> AnalyticsReport {
    AnalyticsReport {
        summary: summarize(readings),
        trends: trend_series(readings),
        distributions: distributions(readings),
        correlations: correlations(readings),
        health_score: health_score(readings.last()),
        activity_metrics: activity_metrics(readings),
        period: period.as_str(),
        total_records: readings.len(),
        date_range: DateRange { start, end },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
