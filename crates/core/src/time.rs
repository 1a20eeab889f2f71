use chrono::{SecondsFormat, Utc};

/// Current UTC time as RFC 3339 with millisecond precision, e.g.
/// `2025-03-01T09:30:00.000Z`. This is the format written to `date`.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Returns the current wall-clock time as milliseconds since Unix epoch.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
