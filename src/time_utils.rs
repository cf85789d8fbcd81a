use time::format_description::{self, well_known::Rfc3339};
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::domain::dashboard::{TimeAgo, Timestamp};

/// Human-readable age of a detection.
///
/// - `< 60s` -> `N seconds ago`
/// - `< 1h` -> `N minutes ago`
/// - `< 1d` -> `N hours ago`
/// - otherwise `N days ago`
///
/// Values are floored, and `now` is injected so the function stays pure.
pub fn format_time_ago(now: Timestamp, observed_at: Timestamp) -> String {
    TimeAgo::between(now, observed_at).to_string()
}

/// Offset-less layouts, read as UTC
const NAIVE_LAYOUTS: [&str; 2] = [
    "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]",
    "[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]",
];

fn parse_naive_utc(value: &str) -> Option<OffsetDateTime> {
    NAIVE_LAYOUTS.iter().find_map(|layout| {
        let items = format_description::parse_owned::<1>(layout).ok()?;
        PrimitiveDateTime::parse(value, &items).ok().map(PrimitiveDateTime::assume_utc)
    })
}

/// Parse an ISO 8601 instant into epoch milliseconds.
///
/// RFC 3339 is tried first; a date-time without an offset is taken as UTC.
/// Pre-epoch instants are rejected.
pub fn parse_iso8601_millis(value: &str) -> Result<Timestamp, String> {
    let trimmed = value.trim();
    let parsed = match OffsetDateTime::parse(trimmed, &Rfc3339) {
        Ok(parsed) => parsed,
        Err(e) => parse_naive_utc(trimmed).ok_or_else(|| format!("invalid ISO 8601 time `{value}`: {e}"))?,
    };
    let millis = parsed.unix_timestamp_nanos() / 1_000_000;
    u64::try_from(millis)
        .map(Timestamp::from_millis)
        .map_err(|_| format!("time `{value}` is before the Unix epoch"))
}

/// Render epoch milliseconds as RFC 3339 (UTC), falling back to the raw number.
pub fn format_rfc3339_millis(timestamp: Timestamp) -> String {
    let nanos = i128::from(timestamp.value()) * 1_000_000;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|t| t.format(&Rfc3339).ok())
        .unwrap_or_else(|| timestamp.value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_round_trips_through_millis() {
        let ts = parse_iso8601_millis("2024-03-01T12:00:00.250Z").unwrap();
        assert_eq!(ts.value(), 1_709_294_400_250);
        assert_eq!(
            format_rfc3339_millis(Timestamp::from_millis(1_709_294_400_000)),
            "2024-03-01T12:00:00Z"
        );
    }

    #[test]
    fn times_without_offset_are_utc() {
        let ts = parse_iso8601_millis("2024-03-01T11:59:00.123456").unwrap();
        assert_eq!(ts.value(), 1_709_294_340_123);
        let ts = parse_iso8601_millis("2024-03-01 11:59:00").unwrap();
        assert_eq!(ts.value(), 1_709_294_340_000);
    }

    #[test]
    fn rejects_garbage_times() {
        assert!(parse_iso8601_millis("yesterday").is_err());
        assert!(parse_iso8601_millis("1960-01-01T00:00:00Z").is_err());
    }
}
