//! Data models for the mobility dashboard.
//!
//! Wire types mirror the backend's `/api/dashboard/` payload; view types are
//! the derived records the dashboard tabs render and the response cache
//! stores.
//!
//! - `DashboardResponse`: the raw combined payload
//! - `BikeStation`, `HeatPoint`, `CongestionZone`, `EventInfo`,
//!   `PedestrianPoint`, `AirStation`: derived view records
//! - `Notification`, `RerouteRequest`: reroute workflow
//! - `Role`, `TransportMode`, `Registration`: account types
//! - `RoutePlan`, `Place`: route planner and geocoding

pub mod air;
pub mod bike;
pub mod bus;
pub mod dashboard;
pub mod event;
pub mod notification;
pub mod pedestrian;
pub mod route;
pub mod user;

pub use air::{AirSample, AirStation, AqiCategory};
pub use bike::{BikeForecast, BikeNotification, BikeStation, StationForecast, StationPosition};
pub use bus::{CongestionZone, HeatPoint};
pub use dashboard::{
    AirPollutionPayload, BikeNotificationsPayload, DashboardResponse, PedestrianPayload,
    PredictionsPayload, RoutePayload,
};
pub use event::{EventInfo, EventSession, RawEvent};
pub use notification::{
    Notification, NotificationQuery, NotificationStatus, NotificationsResponse, RerouteRequest,
    StatusUpdate,
};
pub use pedestrian::{DensityTier, PedestrianPoint, PedestrianReading};
pub use route::{Coordinate, Place, RouteCoord, RouteKind, RoutePlan};
pub use user::{LoginRequest, LoginResponse, MessageResponse, Registration, Role, TransportMode};

/// Serde helpers for the loosely typed parts of the backend payloads.
pub(crate) mod de {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use tracing::warn;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Int(i64),
        Float(f64),
    }

    impl StringOrNumber {
        fn into_string(self) -> String {
            match self {
                StringOrNumber::String(s) => s,
                StringOrNumber::Int(i) => i.to_string(),
                StringOrNumber::Float(f) => f.to_string(),
            }
        }
    }

    /// Ids arrive as numbers from some endpoints and strings from others.
    pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        StringOrNumber::deserialize(deserializer).map(StringOrNumber::into_string)
    }

    pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<StringOrNumber>::deserialize(deserializer)
            .map(|v| v.map(StringOrNumber::into_string))
    }

    /// Numbers that occasionally arrive quoted (`"53.34"`); null and
    /// unparseable strings become `None`.
    pub fn opt_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<StringOrNumber>::deserialize(deserializer)? {
            Some(StringOrNumber::Int(i)) => Some(i as f64),
            Some(StringOrNumber::Float(f)) => Some(f),
            Some(StringOrNumber::String(s)) => s.trim().parse().ok(),
            None => None,
        })
    }

    /// Like `opt_lenient_f64`, with missing values read as 0.
    pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        opt_lenient_f64(deserializer).map(|v| v.unwrap_or(0.0))
    }

    fn number(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Decode items one at a time, dropping the ones that do not fit `T`.
    pub fn decode_items<T: DeserializeOwned>(items: Vec<Value>, what: &str) -> Vec<T> {
        let total = items.len();
        let decoded: Vec<T> = items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect();
        if decoded.len() < total {
            warn!(section = what, skipped = total - decoded.len(), "Skipped malformed rows");
        }
        decoded
    }

    /// A payload section that fails to decode is treated as missing, so one
    /// broken section never takes the others down with it.
    pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let value = Value::deserialize(deserializer)?;
        if value.is_null() {
            return Ok(None);
        }
        match serde_json::from_value(value) {
            Ok(section) => Ok(Some(section)),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed payload section");
                Ok(None)
            }
        }
    }

    /// A list whose bad rows are skipped. Anything but an array is empty.
    pub fn skip_invalid<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(opt_skip_invalid(deserializer)?.unwrap_or_default())
    }

    /// Like `skip_invalid`, but `None` when the value is null or not an
    /// array, so callers can tell "missing" from "empty".
    pub fn opt_skip_invalid<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        match Value::deserialize(deserializer)? {
            Value::Array(items) => Ok(Some(decode_items(items, std::any::type_name::<T>()))),
            Value::Null => Ok(None),
            other => {
                warn!(kind = %value_kind(&other), "Expected a list, ignoring section");
                Ok(None)
            }
        }
    }

    /// Bus heatmap rows (`[lat, lng, intensity?]`). Values that are not
    /// numbers become `None`; rows that are not arrays are dropped.
    pub fn heat_rows<'de, D>(deserializer: D) -> Result<Option<Vec<Vec<Option<f64>>>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Array(rows) => Ok(Some(
                rows.iter()
                    .filter_map(Value::as_array)
                    .map(|row| row.iter().map(number).collect())
                    .collect(),
            )),
            Value::Null => Ok(None),
            other => {
                warn!(kind = %value_kind(&other), "Bus heatmap is not a list, ignoring");
                Ok(None)
            }
        }
    }

    fn value_kind(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(deserialize_with = "super::de::string_or_number")]
        id: String,
        #[serde(default, deserialize_with = "super::de::opt_lenient_f64")]
        value: Option<f64>,
    }

    #[test]
    fn test_ids_accept_numbers_and_strings() {
        let p: Sample = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(p.id, "42");
        let p: Sample = serde_json::from_str(r#"{"id": "abc"}"#).unwrap();
        assert_eq!(p.id, "abc");
    }

    #[test]
    fn test_lenient_f64() {
        let p: Sample = serde_json::from_str(r#"{"id": 1, "value": "53.5"}"#).unwrap();
        assert_eq!(p.value, Some(53.5));
        let p: Sample = serde_json::from_str(r#"{"id": 1, "value": null}"#).unwrap();
        assert_eq!(p.value, None);
        let p: Sample = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        assert_eq!(p.value, None);
        let p: Sample = serde_json::from_str(r#"{"id": 1, "value": 7}"#).unwrap();
        assert_eq!(p.value, Some(7.0));
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        name: String,
        #[serde(deserialize_with = "super::de::lenient_f64")]
        count: f64,
    }

    #[derive(Deserialize)]
    struct Sections {
        #[serde(default, deserialize_with = "super::de::lenient")]
        single: Option<Row>,
        #[serde(default, deserialize_with = "super::de::opt_skip_invalid")]
        rows: Option<Vec<Row>>,
        #[serde(default, deserialize_with = "super::de::heat_rows")]
        heat: Option<Vec<Vec<Option<f64>>>>,
    }

    #[test]
    fn test_malformed_section_reads_as_missing() {
        let s: Sections =
            serde_json::from_str(r#"{"single": {"error": "upstream down"}}"#).unwrap();
        assert!(s.single.is_none());
        let s: Sections =
            serde_json::from_str(r#"{"single": {"name": "a", "count": null}}"#).unwrap();
        assert_eq!(
            s.single,
            Some(Row {
                name: "a".to_string(),
                count: 0.0
            })
        );
    }

    #[test]
    fn test_bad_rows_are_skipped() {
        let s: Sections = serde_json::from_str(
            r#"{"rows": [{"name": "a", "count": 1}, {"count": 2}, "junk", {"name": "b", "count": "3"}]}"#,
        )
        .unwrap();
        let rows = s.rows.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].count, 3.0);

        let s: Sections = serde_json::from_str(r#"{"rows": {"error": "nope"}}"#).unwrap();
        assert!(s.rows.is_none());
        let s: Sections = serde_json::from_str(r#"{"rows": []}"#).unwrap();
        assert_eq!(s.rows.map(|r| r.len()), Some(0));
    }

    #[test]
    fn test_heat_rows_keep_null_cells() {
        let s: Sections =
            serde_json::from_str(r#"{"heat": [[53.3, -6.2, null], "junk", [53.4, "-6.1"]]}"#)
                .unwrap();
        assert_eq!(
            s.heat.unwrap(),
            vec![
                vec![Some(53.3), Some(-6.2), None],
                vec![Some(53.4), Some(-6.1)],
            ]
        );
        let s: Sections = serde_json::from_str(r#"{"heat": {"error": "x"}}"#).unwrap();
        assert!(s.heat.is_none());
    }
}
