//! Printable HTML reports. The same markup is served as-is or handed to the
//! PDF renderer.

use std::fmt::Write as _;

use crate::types::Timestamp;

const REPORT_STYLE: &str = "\
body { font-family: 'Segoe UI', Arial, sans-serif; color: #333; padding: 20px; line-height: 1.5; }
h1 { color: #1e40af; margin-bottom: 4px; }
.header { border-bottom: 3px solid #2563eb; margin-bottom: 24px; padding-bottom: 12px; }
.stats { display: flex; gap: 20px; margin: 20px 0; }
.stat-card { border: 1px solid #ddd; padding: 15px; border-radius: 8px; flex: 1; }
.stat-label { font-size: 12px; color: #666; }
.stat-value { font-size: 24px; font-weight: bold; }
table { width: 100%; border-collapse: collapse; margin: 12px 0 24px; }
th, td { padding: 8px; text-align: left; border-bottom: 1px solid #ddd; }
th { background: #f5f5f5; }
.footer { margin-top: 40px; padding-top: 16px; border-top: 1px solid #ddd; font-size: 12px; color: #666; }";

const DISCLAIMER: &str =
    "This report is for informational purposes only. Consult your healthcare provider for medical advice.";

/// Escape text for inclusion in HTML element content or attribute values.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// A titled two-column table of label / value rows.
#[derive(Debug, Clone, Default)]
pub struct ReportSection {
    pub title: String,
    pub rows: Vec<(String, String)>,
}

impl ReportSection {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            rows: Vec::new(),
        }
    }

    /// Add a row when `value` is present; absent values are skipped.
    pub fn row<T: ToString>(mut self, label: &str, value: Option<T>) -> Self {
        if let Some(v) = value {
            self.rows.push((label.to_string(), v.to_string()));
        }
        self
    }
}

fn open_document(out: &mut String, title: &str) {
    let _ = write!(
        out,
        "<!DOCTYPE html><html><head><meta charset=\"UTF-8\"><title>{}</title><style>{REPORT_STYLE}</style></head><body>",
        escape_html(title)
    );
}

fn close_document(out: &mut String) {
    let _ = write!(out, "<div class=\"footer\"><p>{DISCLAIMER}</p></div></body></html>");
}

fn write_sections(out: &mut String, sections: &[ReportSection]) {
    for section in sections.iter().filter(|s| !s.rows.is_empty()) {
        let _ = write!(out, "<h2>{}</h2><table>", escape_html(&section.title));
        for (label, value) in &section.rows {
            let _ = write!(
                out,
                "<tr><th>{}</th><td>{}</td></tr>",
                escape_html(label),
                escape_html(value)
            );
        }
        out.push_str("</table>");
    }
}

fn stat_card(out: &mut String, label: &str, value: &str) {
    let _ = write!(
        out,
        "<div class=\"stat-card\"><div class=\"stat-label\">{}</div><div class=\"stat-value\">{}</div></div>",
        escape_html(label),
        escape_html(value)
    );
}

// ---------------------------------------------------------------------------
// Period report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PeriodReport {
    pub period: String,
    pub generated_at: Timestamp,
    pub average_systolic: Option<f64>,
    pub average_heart_rate: Option<f64>,
    pub health_score: u32,
    pub total_records: usize,
}

/// Summary report for an analytics period.
pub fn render_period_report(report: &PeriodReport) -> String {
    let fmt_avg = |v: Option<f64>| v.map(|v| format!("{v:.0}")).unwrap_or_else(|| "N/A".into());

    let mut out = String::new();
    open_document(&mut out, "Health Vitals Report");
    let _ = write!(
        out,
        "<div class=\"header\"><h1>Health Vitals Report</h1><p>Period: {}</p><p>Generated: {}</p><p>Readings: {}</p></div>",
        escape_html(&report.period),
        report.generated_at.format("%Y-%m-%d"),
        report.total_records
    );
    out.push_str("<h2>Summary Statistics</h2><div class=\"stats\">");
    stat_card(&mut out, "Average Blood Pressure", &fmt_avg(report.average_systolic));
    stat_card(&mut out, "Average Heart Rate", &fmt_avg(report.average_heart_rate));
    stat_card(&mut out, "Health Score", &format!("{}%", report.health_score));
    out.push_str("</div>");
    close_document(&mut out);
    out
}

// ---------------------------------------------------------------------------
// Scan report
// ---------------------------------------------------------------------------

/// Detailed report for one scan.
pub fn render_scan_report(
    subject: &str,
    recorded_at: Timestamp,
    scan_id: i64,
    sections: &[ReportSection],
) -> String {
    let mut out = String::new();
    open_document(&mut out, "Health Report");
    let _ = write!(
        out,
        "<div class=\"header\"><h1>Health Report</h1><p>{}</p><p>Scan #{scan_id} recorded {}</p></div>",
        escape_html(subject),
        recorded_at.format("%Y-%m-%d %H:%M UTC")
    );
    write_sections(&mut out, sections);
    close_document(&mut out);
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html("<b>\"Tom\" & 'Jerry'</b>"),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn period_report_contains_stats() {
        let html = render_period_report(&PeriodReport {
            period: "30d".into(),
            generated_at: now(),
            average_systolic: Some(121.4),
            average_heart_rate: None,
            health_score: 85,
            total_records: 12,
        });
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Period: 30d"));
        assert!(html.contains(">121<"));
        assert!(html.contains(">N/A<"));
        assert!(html.contains(">85%<"));
    }

    #[test]
    fn scan_report_skips_empty_sections_and_absent_rows() {
        let sections = vec![
            ReportSection::new("Vital Signs")
                .row("Heart Rate", Some(72))
                .row("Temperature", None::<f64>),
            ReportSection::new("Risks").row("ASCVD", None::<String>),
        ];
        let html = render_scan_report("Jane <Doe>", now(), 7, &sections);
        assert!(html.contains("<h2>Vital Signs</h2>"));
        assert!(html.contains("<tr><th>Heart Rate</th><td>72</td></tr>"));
        assert!(!html.contains("Temperature"));
        assert!(!html.contains("<h2>Risks</h2>"));
        assert!(html.contains("Jane &lt;Doe&gt;"));
        assert!(html.contains("Scan #7"));
    }
}
