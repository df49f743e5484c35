//! Per-domain dashboard loaders.
//!
//! Every loader consults the response cache first and only falls back to
//! `GET /api/dashboard/` on a miss. The derived view records (not the raw
//! payload) are what gets cached, so a hit needs no further processing.
//! The route planner is never cached.

pub mod air;
pub mod bikes;
pub mod bus;
pub mod events;
pub mod pedestrian;
pub mod routes;

use anyhow::{anyhow, Result};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use crate::api::{ApiClient, GeocodingClient};
use crate::cache::{keys, CacheManager};
use crate::models::{
    AirStation, BikeStation, CongestionZone, DashboardResponse, EventInfo, HeatPoint, Place,
    PedestrianPoint,
};

pub use routes::{Layer, LayerToggles, RouteFilter, RouteResult};

/// Heatmap points plus the congestion zones found in them.
#[derive(Debug, Clone, Default)]
pub struct BusData {
    pub points: Vec<HeatPoint>,
    pub zones: Vec<CongestionZone>,
}

impl BusData {
    pub fn from_points(points: Vec<HeatPoint>) -> Self {
        let zones = bus::congestion_zones(&points);
        Self { points, zones }
    }
}

/// Clone is cheap: both clients share their connection pools.
#[derive(Clone)]
pub struct DashboardService {
    api: ApiClient,
    geocoder: GeocodingClient,
    cache: CacheManager,
}

impl DashboardService {
    pub fn new(api: ApiClient, geocoder: GeocodingClient, cache: CacheManager) -> Self {
        Self {
            api,
            geocoder,
            cache,
        }
    }

    /// Same service, authenticated with `token` (or anonymous).
    pub fn with_token(&self, token: Option<String>) -> Self {
        Self {
            api: self.api.with_token(token),
            geocoder: self.geocoder.clone(),
            cache: self.cache.clone(),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Cache-first load. On a miss the dashboard payload is fetched and
    /// handed to `store_derived`.
    async fn load_cached<T, F>(&self, key: &str, derive: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Default,
        F: FnOnce(DashboardResponse) -> Result<Option<T>>,
    {
        if let Some(hit) = self.cache.get_as::<T>(key) {
            debug!(key = key, "Serving from cache");
            return Ok(hit);
        }

        let response = self.api.fetch_dashboard().await?;
        self.store_derived(key, response, derive)
    }

    /// Derive one view from a fresh payload. `Some` is cached under `key`.
    /// `Ok(None)` means the payload had nothing for this domain: the default
    /// is returned and nothing cached. Errors are never cached.
    fn store_derived<T, F>(&self, key: &str, response: DashboardResponse, derive: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Default,
        F: FnOnce(DashboardResponse) -> Result<Option<T>>,
    {
        match derive(response)? {
            Some(data) => {
                self.cache.set_as(key, &data);
                Ok(data)
            }
            None => {
                debug!(key = key, "Dashboard payload has no data for this view");
                Ok(T::default())
            }
        }
    }

    pub async fn load_bus(&self) -> Result<BusData> {
        let points: Vec<HeatPoint> = self.load_cached(keys::BUS_HEATMAP, derive_bus).await?;
        Ok(BusData::from_points(points))
    }

    pub async fn load_bikes(&self) -> Result<Vec<BikeStation>> {
        self.load_cached(keys::BIKE_PREDICTIONS, derive_bikes).await
    }

    pub async fn load_events(&self) -> Result<Vec<EventInfo>> {
        self.load_cached(keys::EVENTS, derive_events).await
    }

    pub async fn load_pedestrian(&self) -> Result<Vec<PedestrianPoint>> {
        self.load_cached(keys::PEDESTRIAN, derive_pedestrian).await
    }

    pub async fn load_air(&self) -> Result<Vec<AirStation>> {
        self.load_cached(keys::AIR_POLLUTION, derive_air).await
    }

    /// Autocomplete for the route planner inputs.
    pub async fn suggestions(&self, query: &str) -> Result<Vec<Place>> {
        self.geocoder.suggestions(query).await
    }

    /// Geocode both ends and fetch the three routes with every overlay.
    pub async fn plan_route(&self, source: &str, destination: &str) -> Result<RouteResult> {
        let (from, to) = futures::try_join!(
            self.geocoder.resolve(source),
            self.geocoder.resolve(destination)
        )?;
        let start = from
            .and_then(|p| p.coordinate())
            .ok_or_else(|| anyhow!("Could not find location: {}", source.trim()))?;
        let end = to
            .and_then(|p| p.coordinate())
            .ok_or_else(|| anyhow!("Could not find location: {}", destination.trim()))?;

        info!(?start, ?end, "Planning route");
        let response = self.api.fetch_dashboard_with_route(start, end).await?;
        Ok(routes::route_result(response))
    }

    /// Drop every cached response. The caller reloads its views afterwards.
    pub fn clear_cache(&self) -> usize {
        let removed = self.cache.clear();
        info!(removed = removed, "Response cache cleared");
        removed
    }
}

fn derive_bus(r: DashboardResponse) -> Result<Option<Vec<HeatPoint>>> {
    Ok(bus::heat_points(r.bus_heatmap))
}

fn derive_bikes(r: DashboardResponse) -> Result<Option<Vec<BikeStation>>> {
    let notifications = r.bike_notifications.unwrap_or_default().notifications;
    let forecasts = r.predictions.unwrap_or_default().data;
    bikes::merge_stations(&notifications, &forecasts).map(Some)
}

fn derive_events(r: DashboardResponse) -> Result<Option<Vec<EventInfo>>> {
    events::process(r.events).map(Some)
}

fn derive_pedestrian(r: DashboardResponse) -> Result<Option<Vec<PedestrianPoint>>> {
    pedestrian::process(r.pedestrian).map(Some)
}

fn derive_air(r: DashboardResponse) -> Result<Option<Vec<AirStation>>> {
    Ok(air::stations(r.air_pollution))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(name: &str) -> (DashboardService, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!(
            "eirflow-dashboard-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        // Nothing listens on port 9, so any network access fails fast
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        let geocoder = GeocodingClient::new("http://127.0.0.1:9").unwrap();
        (DashboardService::new(api, geocoder, CacheManager::new(&dir)), dir)
    }

    #[tokio::test]
    async fn test_cache_hit_skips_network() {
        let (svc, dir) = service("hit");
        let points = vec![HeatPoint { lat: 53.3, lng: -6.2, intensity: 1.0 }];
        svc.cache().set_as(keys::BUS_HEATMAP, &points);

        let data = svc.load_bus().await.unwrap();
        assert_eq!(data.points, points);
        assert!(data.zones.is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_cache_miss_reports_network_error() {
        let (svc, dir) = service("miss");
        assert!(svc.load_air().await.is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_refetch() {
        let (svc, dir) = service("clear");
        svc.cache().set_as(keys::AIR_POLLUTION, &Vec::<AirStation>::new());
        assert!(svc.load_air().await.is_ok());
        assert_eq!(svc.clear_cache(), 1);
        assert!(svc.load_air().await.is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }

    const BIKES: &str = r#"
        "bike_notifications": {"notifications": [
            {"station_id": 1, "station_name": "Pearse St", "position": {"lat": 53.34, "lng": -6.25},
             "current_bikes": 4, "total_capacity": 20}
        ]},
        "predictions": {"data": [
            {"latitude": 53.34, "longitude": -6.25,
             "predictions": [{"date": "2025-03-01", "bikes": 9, "stands": 20}]}
        ]}"#;

    fn payload(extra: &str) -> DashboardResponse {
        serde_json::from_str(&format!("{{{},{}}}", BIKES, extra)).unwrap()
    }

    #[test]
    fn test_bad_sibling_sections_leave_bikes_intact() {
        let response = payload(
            r#""bus_heatmap": [[53.3, -6.2, null], [53.31, -6.21, 0.4]],
               "air_pollution": {"data": [{"latitude": 53.35, "longitude": -6.27, "aqi": null, "pm1": 3}]},
               "events": {"error": "upstream timeout"}"#,
        );

        let stations = derive_bikes(response.clone()).unwrap().unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].predicted_bikes, 9.0);

        let points = derive_bus(response.clone()).unwrap().unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].intensity, 1.0);

        let air = derive_air(response.clone()).unwrap().unwrap();
        assert_eq!(air[0].aqi, 0.0);

        let err = derive_events(response).unwrap_err();
        assert_eq!(err.to_string(), events::NO_EVENT_DATA);
    }

    #[test]
    fn test_malformed_bike_row_is_skipped() {
        let response: DashboardResponse = serde_json::from_str(
            r#"{
                "bike_notifications": {"notifications": [
                    {"station_id": 1, "station_name": "Pearse St", "position": {"lat": 53.34, "lng": -6.25},
                     "current_bikes": "4", "total_capacity": null},
                    {"station_id": 2, "station_name": "Broken", "position": null}
                ]},
                "predictions": {"data": [{"latitude": 53.34, "longitude": -6.25, "predictions": []}]},
                "pedestrian": "unavailable"
            }"#,
        )
        .unwrap();
        let stations = derive_bikes(response.clone()).unwrap().unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].current_bikes, 4.0);
        assert_eq!(stations[0].total_capacity, 0.0);
        assert!(derive_pedestrian(response).is_err());
    }

    #[test]
    fn test_store_derived_caches_only_data() {
        let (svc, dir) = service("derived");
        let points = vec![HeatPoint { lat: 53.3, lng: -6.2, intensity: 0.5 }];

        let stored: Vec<HeatPoint> = svc
            .store_derived(keys::BUS_HEATMAP, DashboardResponse::default(), |_| {
                Ok(Some(points.clone()))
            })
            .unwrap();
        assert_eq!(stored, points);
        assert_eq!(svc.cache().get_as::<Vec<HeatPoint>>(keys::BUS_HEATMAP), Some(points));

        let empty: Vec<AirStation> = svc
            .store_derived(keys::AIR_POLLUTION, DashboardResponse::default(), derive_air)
            .unwrap();
        assert!(empty.is_empty());
        assert!(svc.cache().get_as::<Vec<AirStation>>(keys::AIR_POLLUTION).is_none());

        let failed = svc.store_derived(keys::EVENTS, DashboardResponse::default(), derive_events);
        assert!(failed.is_err());
        assert!(svc.cache().get_as::<Vec<EventInfo>>(keys::EVENTS).is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
