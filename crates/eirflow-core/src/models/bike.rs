use serde::{Deserialize, Serialize};

use super::de;

/// Demand ratio above which a station is flagged as high demand.
pub const HIGH_DEMAND_RATIO: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StationPosition {
    pub lat: f64,
    pub lng: f64,
}

/// Live station status from `bike_notifications.notifications`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BikeNotification {
    #[serde(deserialize_with = "de::string_or_number")]
    pub station_id: String,
    pub station_name: String,
    pub position: StationPosition,
    #[serde(default, deserialize_with = "de::lenient_f64")]
    pub current_bikes: f64,
    #[serde(default, deserialize_with = "de::opt_lenient_f64")]
    pub predicted_bikes: Option<f64>,
    #[serde(default, deserialize_with = "de::lenient_f64")]
    pub total_capacity: f64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Forecast series for one station from `predictions.data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationForecast {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, deserialize_with = "de::skip_invalid")]
    pub predictions: Vec<BikeForecast>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BikeForecast {
    pub date: String,
    #[serde(default, deserialize_with = "de::lenient_f64")]
    pub bikes: f64,
    #[serde(default, deserialize_with = "de::lenient_f64")]
    pub stands: f64,
}

impl BikeForecast {
    /// Bikes can never exceed the stands at a station; the model sometimes
    /// says otherwise.
    pub fn clamped_bikes(&self) -> f64 {
        self.bikes.min(self.stands)
    }

    pub fn display_bikes(&self) -> i64 {
        self.clamped_bikes().round() as i64
    }

    pub fn display_stands(&self) -> i64 {
        self.stands.round() as i64
    }

    pub fn formatted_date(&self) -> String {
        crate::utils::format::format_date(&self.date)
    }
}

/// A station with its forecast merged in. This is what the bikes tab shows
/// and what is cached under `bikePredictions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BikeStation {
    pub id: String,
    pub name: String,
    pub position: (f64, f64),
    pub current_bikes: f64,
    pub predicted_bikes: f64,
    pub total_capacity: f64,
    pub demand_ratio: f64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub weekly_predictions: Vec<BikeForecast>,
}

impl BikeStation {
    pub fn compute_demand_ratio(predicted: f64, current: f64, capacity: f64) -> f64 {
        if capacity <= 0.0 {
            return 0.0;
        }
        (predicted - current) / capacity
    }

    pub fn is_high_demand(&self) -> bool {
        self.demand_ratio > HIGH_DEMAND_RATIO
    }

    /// "62.5%"
    pub fn demand_percent(&self) -> String {
        format!("{:.1}%", self.demand_ratio * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demand_ratio() {
        assert_eq!(BikeStation::compute_demand_ratio(30.0, 10.0, 40.0), 0.5);
        assert_eq!(BikeStation::compute_demand_ratio(5.0, 10.0, 20.0), -0.25);
        assert_eq!(BikeStation::compute_demand_ratio(5.0, 0.0, 0.0), 0.0);
    }

    #[test]
    fn test_forecast_clamps_bikes_to_stands() {
        let f = BikeForecast {
            date: "2025-03-01".to_string(),
            bikes: 31.6,
            stands: 30.2,
        };
        assert_eq!(f.clamped_bikes(), 30.2);
        assert_eq!(f.display_bikes(), 30);
        assert_eq!(f.display_stands(), 30);
    }

    #[test]
    fn test_parse_notification_with_numeric_id() {
        let n: BikeNotification = serde_json::from_str(
            r#"{"station_id": 42, "station_name": "Smithfield", "position": {"lat": 53.3477, "lng": -6.2782}, "current_bikes": 4, "total_capacity": 30}"#,
        )
        .unwrap();
        assert_eq!(n.station_id, "42");
        assert_eq!(n.current_bikes, 4.0);
        assert!(n.predicted_bikes.is_none());
    }
}
