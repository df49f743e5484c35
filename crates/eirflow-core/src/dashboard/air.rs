use crate::models::{AirPollutionPayload, AirStation, AqiCategory};

/// Stations from the air pollution payload, named "Station N" by their
/// position in the feed. `None` when the payload carries no data.
pub fn stations(payload: Option<AirPollutionPayload>) -> Option<Vec<AirStation>> {
    let samples = payload?.data?;
    Some(
        samples
            .into_iter()
            .enumerate()
            .filter_map(|(i, sample)| {
                Some(AirStation {
                    name: format!("Station {}", i + 1),
                    latitude: sample.latitude?,
                    longitude: sample.longitude?,
                    aqi: sample.aqi,
                    pm1: sample.pm1,
                    health_impact: sample
                        .health_impact
                        .unwrap_or_else(|| "Not available".to_string()),
                })
            })
            .collect(),
    )
}

/// Station counts per category, in Good/Moderate/High order.
pub fn category_counts(stations: &[AirStation]) -> [(AqiCategory, usize); 3] {
    [AqiCategory::Good, AqiCategory::Moderate, AqiCategory::High]
        .map(|cat| (cat, stations.iter().filter(|s| s.category() == cat).count()))
}

pub fn average_aqi(stations: &[AirStation]) -> Option<f64> {
    if stations.is_empty() {
        return None;
    }
    Some(stations.iter().map(|s| s.aqi).sum::<f64>() / stations.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> Option<AirPollutionPayload> {
        Some(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_missing_data() {
        assert!(stations(None).is_none());
        assert!(stations(payload("{}")).is_none());
    }

    #[test]
    fn test_station_names_and_categories() {
        let stations = stations(payload(
            r#"{"data": [
                {"latitude": 53.1, "longitude": -6.1, "aqi": 5, "pm1": 2.5, "health_impact": "Low"},
                {"latitude": null, "longitude": -6.2, "aqi": 20, "pm1": 8},
                {"latitude": 53.3, "longitude": -6.3, "aqi": 55.5, "pm1": 30}
            ]}"#,
        ))
        .unwrap();

        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].name, "Station 1");
        assert_eq!(stations[1].name, "Station 3");
        assert_eq!(stations[1].health_impact, "Not available");
        assert_eq!(stations[1].category().label(), "Relatively High");

        let counts = category_counts(&stations);
        assert_eq!(counts[0], (AqiCategory::Good, 1));
        assert_eq!(counts[1], (AqiCategory::Moderate, 0));
        assert_eq!(counts[2], (AqiCategory::High, 1));
        assert_eq!(average_aqi(&stations), Some(30.25));
        assert_eq!(average_aqi(&[]), None);
    }
}
