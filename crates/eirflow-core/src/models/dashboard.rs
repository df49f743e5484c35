use serde::{Deserialize, Serialize};

use super::de;
use super::{AirSample, BikeNotification, PedestrianReading, RawEvent, RouteCoord, StationForecast};

/// Combined payload of `GET /api/dashboard/`.
///
/// Every section is optional: the backend omits sections it could not
/// compute, and the route sections only appear when start/end coordinates
/// were supplied. Sections are decoded independently. A section that is
/// null or malformed reads as missing, and bad rows inside a list are
/// skipped, so each view only fails on its own data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardResponse {
    #[serde(default, deserialize_with = "de::heat_rows")]
    pub bus_heatmap: Option<Vec<Vec<Option<f64>>>>,
    #[serde(default, deserialize_with = "de::lenient")]
    pub bike_notifications: Option<BikeNotificationsPayload>,
    #[serde(default, deserialize_with = "de::lenient")]
    pub predictions: Option<PredictionsPayload>,
    #[serde(default, deserialize_with = "de::opt_skip_invalid")]
    pub events: Option<Vec<RawEvent>>,
    #[serde(default, deserialize_with = "de::opt_skip_invalid")]
    pub pedestrian: Option<Vec<PedestrianPayload>>,
    #[serde(default, deserialize_with = "de::lenient")]
    pub air_pollution: Option<AirPollutionPayload>,
    #[serde(default, deserialize_with = "de::lenient")]
    pub normal_route: Option<RoutePayload>,
    #[serde(default, deserialize_with = "de::lenient")]
    pub sustainable_route: Option<RoutePayload>,
    #[serde(default, deserialize_with = "de::lenient")]
    pub clean_route: Option<RoutePayload>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BikeNotificationsPayload {
    #[serde(default, deserialize_with = "de::skip_invalid")]
    pub notifications: Vec<BikeNotification>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictionsPayload {
    #[serde(default, deserialize_with = "de::skip_invalid")]
    pub data: Vec<StationForecast>,
}

/// One pedestrian model run. Only the first run is displayed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PedestrianPayload {
    /// Kept loose so a non-array `data` is reported as invalid pedestrian
    /// data rather than dropped silently.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl PedestrianPayload {
    pub fn readings(&self) -> Option<Vec<PedestrianReading>> {
        match self.data.as_ref()? {
            serde_json::Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect(),
            ),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AirPollutionPayload {
    #[serde(default, deserialize_with = "de::opt_skip_invalid")]
    pub data: Option<Vec<AirSample>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutePayload {
    #[serde(default, deserialize_with = "de::skip_invalid")]
    pub route: Vec<RouteCoord>,
}
