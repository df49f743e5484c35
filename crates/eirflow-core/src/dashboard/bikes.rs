use anyhow::{bail, Result};

use crate::models::{BikeNotification, BikeStation, StationForecast};

pub const NO_BIKE_DATA: &str = "No bike data found.";

/// Merge live station status with forecasts. Stations are matched on exact
/// coordinate equality; a station without a forecast keeps its own
/// `predicted_bikes` (or 0) and an empty weekly series.
pub fn merge_stations(
    notifications: &[BikeNotification],
    forecasts: &[StationForecast],
) -> Result<Vec<BikeStation>> {
    if notifications.is_empty() || forecasts.is_empty() {
        bail!(NO_BIKE_DATA);
    }

    let stations = notifications
        .iter()
        .map(|notification| {
            let forecast = forecasts.iter().find(|f| {
                f.latitude == notification.position.lat && f.longitude == notification.position.lng
            });
            let predicted = forecast
                .and_then(|f| f.predictions.first())
                .map(|p| p.bikes)
                .or(notification.predicted_bikes)
                .unwrap_or(0.0);

            BikeStation {
                id: notification.station_id.clone(),
                name: notification.station_name.clone(),
                position: (notification.position.lat, notification.position.lng),
                current_bikes: notification.current_bikes,
                predicted_bikes: predicted,
                total_capacity: notification.total_capacity,
                demand_ratio: BikeStation::compute_demand_ratio(
                    predicted,
                    notification.current_bikes,
                    notification.total_capacity,
                ),
                status: notification.status.clone(),
                last_updated: notification.last_updated.clone(),
                weekly_predictions: forecast.map(|f| f.predictions.clone()).unwrap_or_default(),
            }
        })
        .collect();

    Ok(stations)
}

/// High-demand stations, highest ratio first.
pub fn high_demand(stations: &[BikeStation]) -> Vec<&BikeStation> {
    let mut busy: Vec<&BikeStation> = stations.iter().filter(|s| s.is_high_demand()).collect();
    busy.sort_by(|a, b| b.demand_ratio.total_cmp(&a.demand_ratio));
    busy
}
