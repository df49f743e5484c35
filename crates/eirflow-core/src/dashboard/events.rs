use anyhow::{bail, Result};
use chrono::{DateTime, Duration, Utc};

use crate::models::{EventInfo, RawEvent};

pub const NO_EVENT_DATA: &str = "No event data found";

/// Window for the "upcoming events" list.
pub const UPCOMING_WINDOW_DAYS: i64 = 7;

/// Keep events that can be placed on the map and fill in display defaults.
pub fn process(events: Option<Vec<RawEvent>>) -> Result<Vec<EventInfo>> {
    let Some(events) = events else {
        bail!(NO_EVENT_DATA);
    };

    Ok(events
        .into_iter()
        .filter_map(|event| {
            let position = event.coordinates()?;
            Some(EventInfo {
                id: event.id,
                name: event.name.unwrap_or_else(|| "Unnamed Event".to_string()),
                description: event
                    .description
                    .unwrap_or_else(|| "No description available".to_string()),
                start_date: event.start_date,
                end_date: event.end_date,
                position,
                schedule: event.event_schedule,
                event_type: event
                    .additional_type
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| "Event".to_string()),
                url: event.url,
            })
        })
        .collect())
}

/// Events starting within `[now, now + 7 days]`, soonest first.
pub fn upcoming(events: &[EventInfo], now: DateTime<Utc>) -> Vec<&EventInfo> {
    let horizon = now + Duration::days(UPCOMING_WINDOW_DAYS);
    let mut soon: Vec<(&EventInfo, DateTime<Utc>)> = events
        .iter()
        .filter_map(|e| e.starts_at().map(|start| (e, start)))
        .filter(|(_, start)| *start >= now && *start <= horizon)
        .collect();
    soon.sort_by_key(|(_, start)| *start);
    soon.into_iter().map(|(e, _)| e).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn raw(json: &str) -> RawEvent {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_missing_events_is_an_error() {
        assert_eq!(process(None).unwrap_err().to_string(), NO_EVENT_DATA);
        assert!(process(Some(vec![])).unwrap().is_empty());
    }

    #[test]
    fn test_defaults_and_geo_filter() {
        let events = vec![
            raw(r#"{"@id": "e1", "location": {"geo": {"latitude": 53.34, "longitude": -6.26}}}"#),
            raw(r#"{"@id": "e2", "name": "No place", "location": {"name": "Somewhere"}}"#),
            raw(
                r#"{"@id": 3, "name": "Jazz Night", "description": "Live jazz", "additionalType": ["Concert", "Music"],
                    "location": {"geo": {"latitude": "53.35", "longitude": "-6.25"}}}"#,
            ),
        ];
        let processed = process(Some(events)).unwrap();
        assert_eq!(processed.len(), 2);

        assert_eq!(processed[0].name, "Unnamed Event");
        assert_eq!(processed[0].description, "No description available");
        assert_eq!(processed[0].event_type, "Event");

        assert_eq!(processed[1].id.as_deref(), Some("3"));
        assert_eq!(processed[1].event_type, "Concert");
        assert_eq!(processed[1].position, (53.35, -6.25));
    }

    #[test]
    fn test_upcoming_window() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let at = |start: &str| EventInfo {
            id: None,
            name: start.to_string(),
            description: String::new(),
            start_date: Some(start.to_string()),
            end_date: None,
            position: (0.0, 0.0),
            schedule: vec![],
            event_type: "Event".to_string(),
            url: None,
        };
        let events = vec![
            at("2025-03-05T10:00:00Z"),
            at("2025-03-01T11:59:00Z"), // already started
            at("2025-03-01T12:00:00Z"),
            at("2025-03-08T12:00:00Z"), // exactly seven days
            at("2025-03-08T12:01:00Z"),
            at("not a date"),
        ];
        let names: Vec<&str> = upcoming(&events, now).iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["2025-03-01T12:00:00Z", "2025-03-05T10:00:00Z", "2025-03-08T12:00:00Z"]
        );
    }
}
