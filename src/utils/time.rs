use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

/// Epoch values above this are taken as milliseconds
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Calendar date N days before today (UTC), saturating at the earliest representable date
pub fn days_ago(days: i64) -> NaiveDate {
    let today = Utc::now().date_naive();
    Duration::try_days(days)
        .and_then(|offset| today.checked_sub_signed(offset))
        .unwrap_or(NaiveDate::MIN)
}

/// ISO-8601 calendar date (`YYYY-MM-DD`) N days before today
pub fn iso_date_days_ago(days: i64) -> String {
    days_ago(days).format("%Y-%m-%d").to_string()
}

/// `(start_date, end_date)` query window covering the last `days` days
pub fn history_window(days: u32) -> (String, String) {
    (iso_date_days_ago(days as i64), iso_date_days_ago(0))
}

/// Four-digit-year ISO form, so dates order correctly as strings
fn iso_date(date: NaiveDate) -> Option<String> {
    (1..=9999)
        .contains(&date.year())
        .then(|| date.format("%Y-%m-%d").to_string())
}

/// `YYYY-MM-DD` of a Unix timestamp in seconds or milliseconds
pub fn iso_date_from_epoch(timestamp: i64) -> Option<String> {
    let seconds = if timestamp.unsigned_abs() >= EPOCH_MILLIS_THRESHOLD as u64 {
        timestamp / 1000
    } else {
        timestamp
    };
    DateTime::from_timestamp(seconds, 0).and_then(|dt| iso_date(dt.date_naive()))
}

/// Canonical `YYYY-MM-DD` form of an upstream date.
///
/// Accepts ISO dates, RFC 3339 timestamps and numeric epoch strings.
pub fn normalize_iso_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return iso_date(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return iso_date(dt.with_timezone(&Utc).date_naive());
    }
    raw.parse::<i64>().ok().and_then(iso_date_from_epoch)
}

/// Timestamp N hours ago, formatted as RFC 3339
pub fn hours_ago_rfc3339(hours: i64) -> String {
    (Utc::now() - Duration::hours(hours)).to_rfc3339()
}
