use serde::{Deserialize, Serialize};

use super::de;
use crate::utils::format::{format_date, format_time};

/// Count above which a street is listed as high pedestrian traffic.
pub const HIGH_TRAFFIC_COUNT: f64 = 200.0;

/// Count above which a street is shown with medium density.
const MEDIUM_TRAFFIC_COUNT: f64 = 100.0;

/// One reading from `pedestrian[0].data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PedestrianReading {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "de::opt_lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_lenient_f64")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_lenient_f64")]
    pub predicted_count: Option<f64>,
    #[serde(default)]
    pub datetime: Option<String>,
}

/// Density band used for marker colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DensityTier {
    None,
    Low,
    Medium,
    High,
}

impl DensityTier {
    pub fn for_count(count: f64) -> Self {
        if count > HIGH_TRAFFIC_COUNT {
            DensityTier::High
        } else if count > MEDIUM_TRAFFIC_COUNT {
            DensityTier::Medium
        } else if count > 0.0 {
            DensityTier::Low
        } else {
            DensityTier::None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DensityTier::None => "none",
            DensityTier::Low => "low",
            DensityTier::Medium => "medium",
            DensityTier::High => "high",
        }
    }
}

/// A located pedestrian forecast, cached under `pedestrianData`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PedestrianPoint {
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub predicted_count: f64,
    pub datetime: Option<String>,
    pub formatted_time: String,
    pub formatted_date: String,
}

impl PedestrianPoint {
    /// `None` when the reading has no coordinates.
    pub fn from_reading(reading: &PedestrianReading) -> Option<Self> {
        let latitude = reading.latitude?;
        let longitude = reading.longitude?;
        let (formatted_time, formatted_date) = match reading.datetime.as_deref() {
            Some(dt) => (format_time(dt), format_date(dt)),
            None => (String::new(), String::new()),
        };
        Some(Self {
            location: reading
                .location
                .clone()
                .unwrap_or_else(|| "Unknown street".to_string()),
            latitude,
            longitude,
            predicted_count: reading.predicted_count.unwrap_or(0.0),
            datetime: reading.datetime.clone(),
            formatted_time,
            formatted_date,
        })
    }

    pub fn tier(&self) -> DensityTier {
        DensityTier::for_count(self.predicted_count)
    }

    pub fn is_high_traffic(&self) -> bool {
        self.predicted_count > HIGH_TRAFFIC_COUNT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_density_tiers() {
        assert_eq!(DensityTier::for_count(250.0), DensityTier::High);
        assert_eq!(DensityTier::for_count(200.0), DensityTier::Medium);
        assert_eq!(DensityTier::for_count(101.0), DensityTier::Medium);
        assert_eq!(DensityTier::for_count(100.0), DensityTier::Low);
        assert_eq!(DensityTier::for_count(1.0), DensityTier::Low);
        assert_eq!(DensityTier::for_count(0.0), DensityTier::None);
    }

    #[test]
    fn test_from_reading_requires_coordinates() {
        let reading = PedestrianReading {
            location: Some("O'Connell St".to_string()),
            latitude: Some(53.35),
            longitude: None,
            predicted_count: Some(300.0),
            datetime: None,
        };
        assert!(PedestrianPoint::from_reading(&reading).is_none());
    }

    #[test]
    fn test_from_reading_formats_time() {
        let reading = PedestrianReading {
            location: Some("Henry St".to_string()),
            latitude: Some(53.35),
            longitude: Some(-6.26),
            predicted_count: Some(201.0),
            datetime: Some("2025-03-01T14:05:00".to_string()),
        };
        let point = PedestrianPoint::from_reading(&reading).unwrap();
        assert_eq!(point.formatted_time, "14:05");
        assert_eq!(point.formatted_date, "Mar 01, 2025");
        assert!(point.is_high_traffic());
        assert_eq!(point.tier(), DensityTier::High);
    }
}
