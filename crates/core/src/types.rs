//! Scalar aliases shared by every crate, plus the date parsing used by
//! the history filters and the dashboard's "today" window.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Database primary keys (PostgreSQL BIGSERIAL).
pub type DbId = i64;

/// Instants, always UTC.
pub type Timestamp = DateTime<Utc>;

/// Which edge of a calendar day a date-only bound stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayEdge {
    Start,
    /// The last millisecond of the day, so `<=` filters include it entirely.
    End,
}

/// Midnight UTC at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> Timestamp {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// 23:59:59.999 UTC on `date`.
pub fn end_of_day(date: NaiveDate) -> Timestamp {
    let last = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    date.and_time(last).and_utc()
}

/// Parse an RFC 3339 instant or a bare `YYYY-MM-DD` date.
///
/// Offsets are normalised to UTC. A bare date is widened to the requested
/// edge of that UTC day. `None` when neither form matches.
pub fn parse_timestamp_bound(value: &str, edge: DayEdge) -> Option<Timestamp> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    Some(match edge {
        DayEdge::Start => start_of_day(date),
        DayEdge::End => end_of_day(date),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_only_bounds_cover_whole_day() {
        let start = parse_timestamp_bound("2024-03-01", DayEdge::Start).unwrap();
        let end = parse_timestamp_bound("2024-03-01", DayEdge::End).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-03-01T00:00:00+00:00");
        assert_eq!(end.format("%H:%M:%S%.3f").to_string(), "23:59:59.999");
    }

    #[test]
    fn rfc3339_bounds_ignore_edge_and_normalise_to_utc() {
        let a = parse_timestamp_bound("2024-03-01T10:00:00+02:00", DayEdge::Start).unwrap();
        let b = parse_timestamp_bound("2024-03-01T10:00:00+02:00", DayEdge::End).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_rfc3339(), "2024-03-01T08:00:00+00:00");
    }

    #[test]
    fn unparseable_values_are_none() {
        assert_eq!(parse_timestamp_bound("03/01/2024", DayEdge::Start), None);
        assert_eq!(parse_timestamp_bound("2024-02-30", DayEdge::End), None);
        assert_eq!(parse_timestamp_bound("", DayEdge::Start), None);
    }
}
