//! Decorative ECG waveform synthesis.
//!
//! Builds a piecewise-sinusoidal PQRST trace from a handful of scalar vitals
//! so the dashboard has something plausible to draw. The output is cosmetic
//! and carries no diagnostic meaning.

use std::f64::consts::PI;
use std::fmt::Write as _;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::calculations::round_to;
use crate::error::CoreError;
use crate::vitals::VitalsSnapshot;

/// Samples per second.
pub const SAMPLE_RATE_HZ: u32 = 500;
pub const DEFAULT_DURATION_SECS: u32 = 5;
pub const MIN_DURATION_SECS: u32 = 1;
pub const MAX_DURATION_SECS: u32 = 30;

/// Physiological bounds on a single beat interval, in seconds.
const MIN_BEAT_INTERVAL: f64 = 0.4;
const MAX_BEAT_INTERVAL: f64 = 2.0;

const DEFAULT_HEART_RATE: f64 = 72.0;
const DEFAULT_HRV_SDNN: f64 = 42.0;
const DEFAULT_STRESS_LEVEL: f64 = 0.3;
const DEFAULT_OXYGEN_SATURATION: f64 = 98.0;

// ---------------------------------------------------------------------------
// Leads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lead {
    I,
    #[default]
    II,
    III,
    AVR,
    AVL,
    AVF,
    V1,
    V2,
    V3,
    V4,
    V5,
    V6,
}

pub const ALL_LEADS: &[Lead] = &[
    Lead::I,
    Lead::II,
    Lead::III,
    Lead::AVR,
    Lead::AVL,
    Lead::AVF,
    Lead::V1,
    Lead::V2,
    Lead::V3,
    Lead::V4,
    Lead::V5,
    Lead::V6,
];

impl Lead {
    pub fn name(self) -> &'static str {
        match self {
            Self::I => "Lead I",
            Self::II => "Lead II",
            Self::III => "Lead III",
            Self::AVR => "aVR",
            Self::AVL => "aVL",
            Self::AVF => "aVF",
            Self::V1 => "V1",
            Self::V2 => "V2",
            Self::V3 => "V3",
            Self::V4 => "V4",
            Self::V5 => "V5",
            Self::V6 => "V6",
        }
    }

    /// Relative R-wave amplitude for this lead (negative for aVR).
    pub fn amplitude(self) -> f64 {
        match self {
            Self::I => 1.0,
            Self::II => 1.2,
            Self::III => 0.8,
            Self::AVR => -0.5,
            Self::AVL => 0.6,
            Self::AVF => 1.1,
            Self::V1 => 0.3,
            Self::V2 => 0.8,
            Self::V3 => 1.5,
            Self::V4 => 2.0,
            Self::V5 => 1.8,
            Self::V6 => 1.2,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::I => "Left arm - Right arm",
            Self::II => "Left leg - Right arm",
            Self::III => "Left leg - Left arm",
            Self::AVR => "Augmented Right arm",
            Self::AVL => "Augmented Left arm",
            Self::AVF => "Augmented Left leg",
            Self::V1 => "Right sternal border",
            Self::V2 => "Left sternal border",
            Self::V3 => "Between V2 and V4",
            Self::V4 => "Left midclavicular line",
            Self::V5 => "Left anterior axillary line",
            Self::V6 => "Left midaxillary line",
        }
    }

    /// Accepts `"II"`, `"Lead II"` or an augmented / precordial name.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        let short = value.trim();
        let short = short.strip_prefix("Lead ").unwrap_or(short);
        ALL_LEADS
            .iter()
            .copied()
            .find(|lead| {
                let name = lead.name();
                name.strip_prefix("Lead ").unwrap_or(name) == short
            })
            .ok_or_else(|| CoreError::Validation(format!("Unknown ECG lead '{value}'")))
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EcgInput {
    pub heart_rate: f64,
    pub hrv_sdnn: f64,
    pub stress_level: f64,
    pub oxygen_saturation: f64,
}

impl Default for EcgInput {
    fn default() -> Self {
        Self {
            heart_rate: DEFAULT_HEART_RATE,
            hrv_sdnn: DEFAULT_HRV_SDNN,
            stress_level: DEFAULT_STRESS_LEVEL,
            oxygen_saturation: DEFAULT_OXYGEN_SATURATION,
        }
    }
}

impl EcgInput {
    /// Missing or non-positive fields fall back to resting defaults.
    pub fn from_snapshot(snapshot: &VitalsSnapshot) -> Self {
        let or = |value: Option<f64>, default: f64| value.filter(|v| *v > 0.0).unwrap_or(default);
        Self {
            heart_rate: or(snapshot.heart_rate, DEFAULT_HEART_RATE),
            hrv_sdnn: or(snapshot.hrv_sdnn, DEFAULT_HRV_SDNN),
            stress_level: or(snapshot.stress_level, DEFAULT_STRESS_LEVEL),
            oxygen_saturation: or(snapshot.oxygen_saturation, DEFAULT_OXYGEN_SATURATION),
        }
    }

    /// Nominal beat-to-beat interval in seconds.
    fn rr_interval(&self) -> f64 {
        60.0 / self.heart_rate
    }
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Display intervals derived from the inputs by fixed formulas (ms unless noted).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EcgMetrics {
    pub pr_interval: f64,
    pub qrs_duration: f64,
    pub qt_interval: f64,
    /// Bazett-corrected QT.
    pub qtc_interval: f64,
    pub rr_interval: f64,
    pub heart_rate: f64,
    pub p_wave_duration: f64,
    pub t_wave_duration: f64,
    /// mV.
    pub t_wave_deflection: f64,
    pub intervals_measured: u32,
}

pub fn metrics(input: &EcgInput) -> EcgMetrics {
    let hr = input.heart_rate;
    let rr = input.rr_interval();
    let qt = 400.0 - (hr - 60.0) * 2.0;

    EcgMetrics {
        pr_interval: (160.0 - (hr - 60.0) * 0.4).round(),
        qrs_duration: (90.0 + input.stress_level * 20.0).round(),
        qt_interval: qt.round(),
        qtc_interval: (qt / rr.sqrt()).round(),
        rr_interval: (rr * 1000.0).round(),
        heart_rate: hr.round(),
        p_wave_duration: if hr > 100.0 { 70.0 } else { 80.0 },
        t_wave_duration: (160.0 - (hr - 60.0) * 0.5).round(),
        t_wave_deflection: round_to(0.2 + input.stress_level * 0.1, 2),
        intervals_measured: 5,
    }
}

// ---------------------------------------------------------------------------
// Synthesis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EcgTrace {
    pub lead: &'static str,
    pub lead_description: &'static str,
    pub sample_rate: u32,
    pub duration_secs: u32,
    pub seed: u64,
    /// Amplitude in mV, one entry per sample.
    pub samples: Vec<f64>,
    pub metrics: EcgMetrics,
}

/// Resolve a requested duration, defaulting to 5 s.
pub fn validate_duration(duration_secs: Option<u32>) -> Result<u32, CoreError> {
    let duration = duration_secs.unwrap_or(DEFAULT_DURATION_SECS);
    if (MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&duration) {
        Ok(duration)
    } else {
        Err(CoreError::Validation(format!(
            "ECG duration must be between {MIN_DURATION_SECS} and {MAX_DURATION_SECS} seconds"
        )))
    }
}

/// One PQRST complex evaluated at a fraction `t` of the beat.
fn pqrst(t: f64, base: f64, input: &EcgInput) -> f64 {
    let wave = |start: f64, end: f64, scale: f64| scale * base * (PI * (t - start) / (end - start)).sin();

    match t {
        t if (0.05..0.15).contains(&t) => wave(0.05, 0.15, 0.15),
        t if (0.17..0.19).contains(&t) => wave(0.17, 0.19, -0.1),
        t if (0.19..0.23).contains(&t) => wave(0.19, 0.23, 1.0),
        t if (0.23..0.25).contains(&t) => wave(0.23, 0.25, -0.3),
        t if (0.30..0.55).contains(&t) => {
            let mut amplitude = wave(0.30, 0.55, 0.35);
            if input.stress_level > 0.5 {
                amplitude *= 0.8;
            }
            if input.oxygen_saturation < 90.0 {
                amplitude *= 0.7;
            }
            amplitude
        }
        _ => 0.0,
    }
}

/// Synthesise `duration_secs` of signal for `lead`. The same seed always
/// yields the same samples.
pub fn synthesize(input: &EcgInput, lead: Lead, duration_secs: u32, seed: u64) -> EcgTrace {
    let mut rng = StdRng::seed_from_u64(seed);
    let duration = f64::from(duration_secs);
    let rr = input.rr_interval();

    let mut beats = Vec::new();
    let mut t = 0.0;
    while t < duration {
        beats.push(t);
        let jitter = (rng.random::<f64>() - 0.5) * (input.hrv_sdnn / 1000.0);
        t += (rr + jitter).clamp(MIN_BEAT_INTERVAL, MAX_BEAT_INTERVAL);
    }

    let total = (duration_secs * SAMPLE_RATE_HZ) as usize;
    let base = lead.amplitude();
    let mut samples = Vec::with_capacity(total);
    let mut beat = 0usize;

    for i in 0..total {
        let time = i as f64 / f64::from(SAMPLE_RATE_HZ);
        while beat + 1 < beats.len() && time >= beats[beat + 1] {
            beat += 1;
        }

        let start = beats[beat];
        let end = beats.get(beat + 1).copied().unwrap_or(start + rr);
        let mut amplitude = if time >= start && time < end {
            pqrst((time - start) / (end - start), base, input)
        } else {
            0.0
        };

        amplitude += 0.02 * (2.0 * PI * 0.15 * time).sin();
        amplitude += (rng.random::<f64>() - 0.5) * 0.01;
        samples.push(amplitude);
    }

    EcgTrace {
        lead: lead.name(),
        lead_description: lead.description(),
        sample_rate: SAMPLE_RATE_HZ,
        duration_secs,
        seed,
        samples,
        metrics: metrics(input),
    }
}

/// Render samples as an SVG path spanning `width` x `height`.
///
/// The baseline sits at mid-height and 1 mV spans a quarter of the height.
pub fn svg_path(samples: &[f64], width: f64, height: f64) -> String {
    if samples.is_empty() {
        return String::new();
    }

    let step = if samples.len() > 1 {
        width / (samples.len() - 1) as f64
    } else {
        0.0
    };
    let mid = height / 2.0;
    let scale = height / 4.0;

    let mut path = String::with_capacity(samples.len() * 16);
    for (i, amplitude) in samples.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        let x = i as f64 * step;
        let y = mid - amplitude * scale;
        let _ = write!(path, "{cmd}{x:.2},{y:.2} ");
    }
    path.pop();
    path
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn sample_count_is_duration_times_rate() {
        let trace = synthesize(&EcgInput::default(), Lead::II, 5, 1);
        assert_eq!(trace.samples.len(), 2500);
        let trace = synthesize(&EcgInput::default(), Lead::V4, 1, 1);
        assert_eq!(trace.samples.len(), 500);
    }

    #[test]
    fn same_seed_same_trace() {
        let input = EcgInput::default();
        let a = synthesize(&input, Lead::II, 3, 42);
        let b = synthesize(&input, Lead::II, 3, 42);
        assert_eq!(a.samples, b.samples);

        let c = synthesize(&input, Lead::II, 3, 43);
        assert_ne!(a.samples, c.samples);
    }

    #[test]
    fn avr_is_inverted() {
        let input = EcgInput::default();
        let ii = synthesize(&input, Lead::II, 2, 7);
        let avr = synthesize(&input, Lead::AVR, 2, 7);
        let max_ii = ii.samples.iter().copied().fold(f64::MIN, f64::max);
        let min_avr = avr.samples.iter().copied().fold(f64::MAX, f64::min);
        assert!(max_ii > 1.0);
        assert!(min_avr < -0.4);
    }

    #[test]
    fn t_wave_flattens_under_stress_and_hypoxia() {
        let calm = EcgInput::default();
        let stressed = EcgInput {
            stress_level: 0.9,
            oxygen_saturation: 85.0,
            ..calm
        };
        let peak = 0.425;
        let expected = pqrst(peak, 1.0, &calm) * 0.8 * 0.7;
        assert!((pqrst(peak, 1.0, &stressed) - expected).abs() < 1e-12);
    }

    #[test]
    fn snapshot_defaults_apply_to_missing_and_zero_values() {
        let snap = VitalsSnapshot {
            heart_rate: Some(0.0),
            hrv_sdnn: Some(55.0),
            ..Default::default()
        };
        let input = EcgInput::from_snapshot(&snap);
        assert_eq!(input.heart_rate, 72.0);
        assert_eq!(input.hrv_sdnn, 55.0);
        assert_eq!(input.stress_level, 0.3);
        assert_eq!(input.oxygen_saturation, 98.0);
    }

    #[test]
    fn metrics_at_sixty_bpm() {
        let m = metrics(&EcgInput {
            heart_rate: 60.0,
            stress_level: 0.5,
            ..EcgInput::default()
        });
        assert_eq!(m.pr_interval, 160.0);
        assert_eq!(m.qrs_duration, 100.0);
        assert_eq!(m.qt_interval, 400.0);
        assert_eq!(m.qtc_interval, 400.0);
        assert_eq!(m.rr_interval, 1000.0);
        assert_eq!(m.p_wave_duration, 80.0);
        assert_eq!(m.t_wave_duration, 160.0);
        assert_eq!(m.t_wave_deflection, 0.25);
        assert_eq!(m.intervals_measured, 5);
    }

    #[test]
    fn tachycardia_shortens_p_wave() {
        let m = metrics(&EcgInput {
            heart_rate: 120.0,
            ..EcgInput::default()
        });
        assert_eq!(m.p_wave_duration, 70.0);
        assert_eq!(m.rr_interval, 500.0);
    }

    #[test]
    fn duration_bounds() {
        assert_eq!(validate_duration(None).unwrap(), 5);
        assert_eq!(validate_duration(Some(30)).unwrap(), 30);
        assert_matches!(validate_duration(Some(0)), Err(CoreError::Validation(_)));
        assert_matches!(validate_duration(Some(31)), Err(CoreError::Validation(_)));
    }

    #[test]
    fn lead_parsing() {
        assert_eq!(Lead::parse("II").unwrap(), Lead::II);
        assert_eq!(Lead::parse("Lead III").unwrap(), Lead::III);
        assert_eq!(Lead::parse("aVF").unwrap(), Lead::AVF);
        assert_eq!(Lead::parse("V6").unwrap(), Lead::V6);
        assert!(Lead::parse("V7").is_err());
    }

    #[test]
    fn svg_path_shape() {
        assert_eq!(svg_path(&[], 100.0, 40.0), "");
        assert_eq!(
            svg_path(&[0.0, 1.0, -1.0], 100.0, 40.0),
            "M0.00,20.00 L50.00,10.00 L100.00,30.00"
        );
    }
}
