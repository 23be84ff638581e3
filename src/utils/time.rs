//! Time and timestamp utilities

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::types::EventTime;

/// Current instant in UTC
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format an instant as ISO 8601 with millisecond precision (`2024-05-01T12:00:00.000Z`)
pub fn to_iso8601(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a caller-supplied timestamp.
///
/// Accepts RFC 3339 with any offset, normalized to UTC. Anything else is kept
/// verbatim as [`EventTime::Malformed`] so it can be echoed back but never
/// counted inside a statistics window.
pub fn parse_event_time(raw: &str) -> EventTime {
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(parsed) => EventTime::At(parsed.with_timezone(&Utc)),
        Err(_) => EventTime::Malformed(raw.to_string()),
    }
}

/// Interpret whatever JSON value the caller sent as a timestamp.
///
/// Strings go through [`parse_event_time`]; integers are epoch milliseconds;
/// `null` counts as not supplied. Any other value is kept as its JSON text.
pub fn event_time_from_json(value: Value) -> EventTime {
    match value {
        Value::String(raw) => parse_event_time(&raw),
        Value::Null => EventTime::Malformed(String::new()),
        Value::Number(ref n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(EventTime::At)
            .unwrap_or_else(|| EventTime::Malformed(value.to_string())),
        other => EventTime::Malformed(other.to_string()),
    }
}

/// Serde helper writing an instant through [`to_iso8601`]
pub fn serialize_iso8601<S>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&to_iso8601(at))
}
