//! CSV rendering for vitals history and full account exports.

use serde_json::Value;

use crate::vitals::VitalsSnapshot;

/// Column headers of the vitals CSV, in output order.
pub const VITALS_CSV_HEADERS: &[&str] = &[
    "Date",
    "Time",
    "Blood Pressure",
    "Heart Rate (bpm)",
    "Temperature (°C)",
    "Oxygen Saturation (%)",
    "Respiratory Rate",
    "Blood Glucose (mg/dL)",
    "Weight (kg)",
    "BMI",
    "Pain Level",
    "Notes",
    "Symptoms",
];

/// Account export formats accepted by the settings export endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    /// `None` for anything other than `json` / `csv`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Escaping
// ---------------------------------------------------------------------------

/// Quote a CSV field when it contains a comma, quote or line break.
pub fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn num(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Vitals CSV
// ---------------------------------------------------------------------------

/// One header row plus exactly one row per reading, in the order given.
pub fn vitals_csv(readings: &[VitalsSnapshot]) -> String {
    let mut lines = Vec::with_capacity(readings.len() + 1);
    lines.push(VITALS_CSV_HEADERS.iter().map(|h| csv_escape(h)).collect::<Vec<_>>().join(","));

    for r in readings {
        let blood_pressure = match (r.blood_pressure_systolic, r.blood_pressure_diastolic) {
            (Some(s), Some(d)) => format!("{s}/{d}"),
            _ => String::new(),
        };

        let row = [
            r.recorded_at.format("%Y-%m-%d").to_string(),
            r.recorded_at.format("%H:%M:%S").to_string(),
            blood_pressure,
            num(r.heart_rate),
            num(r.temperature),
            num(r.oxygen_saturation),
            num(r.respiratory_rate),
            num(r.blood_glucose),
            num(r.weight),
            r.bmi.map(|b| format!("{b:.2}")).unwrap_or_default(),
            num(r.pain_level),
            r.notes.clone().unwrap_or_default(),
            r.symptoms.clone().unwrap_or_default(),
        ];
        lines.push(row.iter().map(|v| csv_escape(v)).collect::<Vec<_>>().join(","));
    }

    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Account CSV
// ---------------------------------------------------------------------------

/// Flatten nested objects into dotted keys. Arrays are kept as JSON text.
pub fn flatten_json(value: &Value, prefix: &str, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_json(inner, &path, out);
            }
        }
        Value::Null => out.push((prefix.to_string(), String::new())),
        Value::String(s) => out.push((prefix.to_string(), s.clone())),
        Value::Bool(b) => out.push((prefix.to_string(), b.to_string())),
        Value::Number(n) => out.push((prefix.to_string(), n.to_string())),
        Value::Array(_) => out.push((prefix.to_string(), value.to_string())),
    }
}

/// Render an account export as CSV.
///
/// `base` holds the per-account fields (user, profile, settings). Each entry
/// of `records` becomes its own row under the `record_prefix` columns, with
/// the base columns repeated. With no records a single base row is written.
pub fn account_csv(base: &Value, records: &[Value], record_prefix: &str) -> String {
    let mut base_fields = Vec::new();
    flatten_json(base, "", &mut base_fields);

    let record_rows: Vec<Vec<(String, String)>> = records
        .iter()
        .map(|record| {
            let mut fields = Vec::new();
            flatten_json(record, record_prefix, &mut fields);
            fields
        })
        .collect();

    let mut headers: Vec<String> = base_fields.iter().map(|(k, _)| k.clone()).collect();
    for row in &record_rows {
        for (key, _) in row {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let render = |extra: &[(String, String)]| -> String {
        headers
            .iter()
            .map(|h| {
                base_fields
                    .iter()
                    .chain(extra)
                    .find(|(k, _)| k == h)
                    .map(|(_, v)| csv_escape(v))
                    .unwrap_or_default()
            })
            .collect::<Vec<_>>()
            .join(",")
    };

    let mut lines = vec![headers.iter().map(|h| csv_escape(h)).collect::<Vec<_>>().join(",")];
    if record_rows.is_empty() {
        lines.push(render(&[]));
    } else {
        lines.extend(record_rows.iter().map(|row| render(row)));
    }
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
