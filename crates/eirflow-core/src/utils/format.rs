use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Parse the timestamp formats the backend and event feeds use: RFC 3339,
/// naive `YYYY-MM-DDTHH:MM:SS` (taken as UTC) and bare `YYYY-MM-DD`.
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%a, %d %b %Y %H:%M:%S GMT",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Format a date string to a more readable format
pub fn format_date(date: &str) -> String {
    if let Some(dt) = parse_datetime(date) {
        dt.format("%b %d, %Y").to_string()
    } else if date.len() >= 10 {
        date.chars().take(10).collect()
    } else {
        date.to_string()
    }
}

/// "14:05", or the raw string when it cannot be parsed
pub fn format_time(date: &str) -> String {
    match parse_datetime(date) {
        Some(dt) => dt.format("%H:%M").to_string(),
        None => date.to_string(),
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// "53.34980, -6.26030"
pub fn format_coordinates(lat: f64, lng: f64) -> String {
    format!("{:.5}, {:.5}", lat, lng)
}
