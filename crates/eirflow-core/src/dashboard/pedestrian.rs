use anyhow::{bail, Result};

use crate::models::{PedestrianPayload, PedestrianPoint};

pub const INVALID_PEDESTRIAN_DATA: &str = "Invalid or missing pedestrian data.";

/// Points from the first model run. The run's `data` must be an array;
/// readings without coordinates are dropped.
pub fn process(payloads: Option<Vec<PedestrianPayload>>) -> Result<Vec<PedestrianPoint>> {
    let Some(readings) = payloads
        .as_ref()
        .and_then(|runs| runs.first())
        .and_then(PedestrianPayload::readings)
    else {
        bail!(INVALID_PEDESTRIAN_DATA);
    };

    Ok(readings.iter().filter_map(PedestrianPoint::from_reading).collect())
}

/// Streets above the high-traffic threshold, busiest first.
pub fn high_traffic(points: &[PedestrianPoint]) -> Vec<&PedestrianPoint> {
    let mut busy: Vec<&PedestrianPoint> = points.iter().filter(|p| p.is_high_traffic()).collect();
    busy.sort_by(|a, b| b.predicted_count.total_cmp(&a.predicted_count));
    busy
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payloads(json: &str) -> Option<Vec<PedestrianPayload>> {
        Some(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_invalid_shapes() {
        for input in [None, payloads("[]"), payloads(r#"[{"data": {"a": 1}}]"#), payloads(r#"[{}]"#)] {
            assert_eq!(process(input).unwrap_err().to_string(), INVALID_PEDESTRIAN_DATA);
        }
    }

    #[test]
    fn test_process_and_high_traffic() {
        let input = payloads(
            r#"[{"data": [
                {"location": "Grafton St", "latitude": 53.341, "longitude": -6.259, "predicted_count": 250},
                {"location": "Henry St", "latitude": 53.349, "longitude": -6.262, "predicted_count": 420},
                {"location": "Dame St", "latitude": 53.344, "longitude": -6.265, "predicted_count": 200},
                {"location": "Nowhere", "predicted_count": 999}
            ]}, {"data": []}]"#,
        );
        let points = process(input).unwrap();
        assert_eq!(points.len(), 3);

        let busy: Vec<&str> = high_traffic(&points).iter().map(|p| p.location.as_str()).collect();
        assert_eq!(busy, vec!["Henry St", "Grafton St"]);
    }
}
