//! Timestamp decoding for collaborator records.
//!
//! The collaborator stores naive UTC columns, so most timestamps arrive
//! without an offset (`2024-05-01T12:00:00.123456`). Records written through
//! other paths carry RFC 3339 offsets. Both decode to `DateTime<Utc>`; a
//! naive value is taken as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an RFC 3339 or offset-less timestamp.
pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// `deserialize_with` helper for `Option<DateTime<Utc>>` fields.
///
/// `null`, a missing field, and an unparsable string all read as `None`.
pub fn optional<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn naive_microseconds_read_as_utc() {
        let ts = parse("2024-05-01T12:00:00.123456").unwrap();
        assert_eq!(ts.year(), 2024);
        assert_eq!(ts.hour(), 12);
        assert_eq!(ts.nanosecond(), 123_456_000);
    }

    #[test]
    fn naive_without_fraction() {
        assert!(parse("2024-05-01T12:00:00").is_some());
        assert!(parse("2024-05-01 12:00:00").is_some());
    }

    #[test]
    fn offsets_are_normalised() {
        let ts = parse("2024-05-01T14:00:00+02:00").unwrap();
        assert_eq!(ts.hour(), 12);
        assert_eq!(parse("2024-05-01T12:00:00Z"), Some(ts));
    }

    #[test]
    fn garbage_is_none() {
        assert!(parse("yesterday").is_none());
    }
}
