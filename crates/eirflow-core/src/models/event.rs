use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::de;
use crate::utils::format::parse_datetime;

/// Event as published by the backend (schema.org-style JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(rename = "@id", default, deserialize_with = "de::opt_string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "startDate", default)]
    pub start_date: Option<String>,
    #[serde(rename = "endDate", default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub location: Option<RawEventLocation>,
    #[serde(rename = "eventSchedule", default, deserialize_with = "de::skip_invalid")]
    pub event_schedule: Vec<EventSession>,
    #[serde(rename = "additionalType", default, deserialize_with = "de::skip_invalid")]
    pub additional_type: Vec<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl RawEvent {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let geo = self.location.as_ref()?.geo.as_ref()?;
        Some((geo.latitude?, geo.longitude?))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEventLocation {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub geo: Option<GeoCoordinates>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoCoordinates {
    #[serde(default, deserialize_with = "de::opt_lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_lenient_f64")]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSession {
    #[serde(rename = "startDate", default)]
    pub start_date: Option<String>,
    #[serde(rename = "startTime", default)]
    pub start_time: Option<String>,
    #[serde(rename = "endTime", default)]
    pub end_time: Option<String>,
}

impl EventSession {
    /// "Mar 01, 2025: 19:00 - 22:00"
    pub fn summary(&self) -> String {
        let date = self
            .start_date
            .as_deref()
            .map(crate::utils::format::format_date)
            .unwrap_or_else(|| "TBD".to_string());
        format!(
            "{}: {} - {}",
            date,
            self.start_time.as_deref().unwrap_or("?"),
            self.end_time.as_deref().unwrap_or("?")
        )
    }
}

/// Event with a map position, as shown on the events tab and cached under
/// `eventsData`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventInfo {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub position: (f64, f64),
    #[serde(default)]
    pub schedule: Vec<EventSession>,
    pub event_type: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl EventInfo {
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        self.start_date.as_deref().and_then(parse_datetime)
    }

    pub fn formatted_start(&self) -> String {
        format_event_date(&self.start_date)
    }

    pub fn formatted_end(&self) -> String {
        format_event_date(&self.end_date)
    }

    /// "Mar 01, 2025 - Mar 02, 2025"
    pub fn date_range(&self) -> String {
        format!("{} - {}", self.formatted_start(), self.formatted_end())
    }

    /// First session's hours, if the event publishes a schedule.
    pub fn first_session_hours(&self) -> Option<String> {
        let first = self.schedule.first()?;
        Some(format!(
            "{} - {}",
            first.start_time.as_deref().unwrap_or("?"),
            first.end_time.as_deref().unwrap_or("?")
        ))
    }
}

fn format_event_date(date: &Option<String>) -> String {
    match date.as_deref().and_then(parse_datetime) {
        Some(dt) => dt.format("%b %d, %Y").to_string(),
        None => "TBD".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_event_coordinates() {
        let raw: RawEvent = serde_json::from_str(
            r#"{"@id": "evt-1", "name": "Gig", "location": {"geo": {"latitude": "53.34", "longitude": -6.26}}}"#,
        )
        .unwrap();
        assert_eq!(raw.coordinates(), Some((53.34, -6.26)));

        let raw: RawEvent =
            serde_json::from_str(r#"{"name": "No place", "location": {"name": "Somewhere"}}"#).unwrap();
        assert_eq!(raw.coordinates(), None);
    }

    #[test]
    fn test_session_summary() {
        let s = EventSession {
            start_date: Some("2025-03-01".to_string()),
            start_time: Some("19:00".to_string()),
            end_time: None,
        };
        assert_eq!(s.summary(), "Mar 01, 2025: 19:00 - ?");
    }
}
