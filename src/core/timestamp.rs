//! Timestamp formatting utilities
//!
//! Records carry their `time` as ISO 8601 with milliseconds and a `Z`
//! suffix (`2025-01-08T10:30:45.123Z`). The text renderer parses that back
//! and can show it in UTC or in the local time zone.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

const ISO8601_MILLIS: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Format a record time as ISO 8601 with milliseconds
#[must_use]
pub fn format_iso8601(datetime: &DateTime<Utc>) -> String {
    datetime.format(ISO8601_MILLIS).to_string()
}

/// Parse an RFC 3339 / ISO 8601 record time
pub fn parse_iso8601(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Time zone used when rendering record times as text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeDisplay {
    #[default]
    Utc,
    Local,
}

impl TimeDisplay {
    /// Full date and time for the `long` output mode
    ///
    /// Times that do not parse are returned unchanged.
    #[must_use]
    pub fn full(&self, raw: &str) -> String {
        match (self, parse_iso8601(raw)) {
            (TimeDisplay::Utc, _) | (_, None) => raw.to_string(),
            (TimeDisplay::Local, Some(dt)) => dt
                .with_timezone(&Local)
                .format("%Y-%m-%dT%H:%M:%S%.3f%:z")
                .to_string(),
        }
    }

    /// Time of day only, for the `short` output mode
    #[must_use]
    pub fn time_of_day(&self, raw: &str) -> String {
        match self {
            TimeDisplay::Utc => {
                if raw.len() > 11 && raw.as_bytes()[10] == b'T' {
                    raw[11..].to_string()
                } else {
                    raw.to_string()
                }
            }
            TimeDisplay::Local => match parse_iso8601(raw) {
                Some(dt) => dt.with_timezone(&Local).format("%H:%M:%S%.3f").to_string(),
                None => raw.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_datetime() -> DateTime<Utc> {
        // 2025-01-08 10:30:45.123456 UTC
        Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45)
            .single()
            .expect("valid datetime")
            + chrono::Duration::microseconds(123456)
    }

    #[test]
    fn test_iso8601_format() {
        assert_eq!(format_iso8601(&fixed_datetime()), "2025-01-08T10:30:45.123Z");
    }

    #[test]
    fn test_parse_round_trip_keeps_millis() {
        let parsed = parse_iso8601("2025-01-08T10:30:45.123Z").expect("parse");
        assert_eq!(format_iso8601(&parsed), "2025-01-08T10:30:45.123Z");
        assert!(parse_iso8601("yesterday").is_none());
    }

    #[test]
    fn test_utc_display() {
        let raw = "2025-01-08T10:30:45.123Z";
        assert_eq!(TimeDisplay::Utc.full(raw), raw);
        assert_eq!(TimeDisplay::Utc.time_of_day(raw), "10:30:45.123Z");
    }

    #[test]
    fn test_unparseable_time_passes_through() {
        assert_eq!(TimeDisplay::Local.full("soon"), "soon");
        assert_eq!(TimeDisplay::Utc.time_of_day("soon"), "soon");
        assert_eq!(TimeDisplay::Local.time_of_day("soon"), "soon");
    }

    #[test]
    fn test_local_display_shape() {
        let shown = TimeDisplay::Local.time_of_day("2025-01-08T10:30:45.123Z");
        assert_eq!(shown.len(), "10:30:45.123".len());
        assert!(shown.ends_with(".123"));
    }

    #[test]
    fn test_serialization() {
        assert_eq!(serde_json::to_string(&TimeDisplay::Local).expect("serialize"), "\"local\"");
        let parsed: TimeDisplay = serde_json::from_str("\"utc\"").expect("deserialize");
        assert_eq!(parsed, TimeDisplay::Utc);
    }
}
