use serde::{Deserialize, Serialize};

use super::de;

/// One air-quality sample from `air_pollution.data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirSample {
    #[serde(deserialize_with = "de::opt_lenient_f64", default)]
    pub latitude: Option<f64>,
    #[serde(deserialize_with = "de::opt_lenient_f64", default)]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "de::lenient_f64")]
    pub aqi: f64,
    #[serde(default, deserialize_with = "de::lenient_f64")]
    pub pm1: f64,
    #[serde(default)]
    pub health_impact: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AqiCategory {
    Good,
    Moderate,
    High,
}

impl AqiCategory {
    pub fn for_aqi(aqi: f64) -> Self {
        if aqi < 10.0 {
            AqiCategory::Good
        } else if aqi <= 40.0 {
            AqiCategory::Moderate
        } else {
            AqiCategory::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AqiCategory::Good => "Relatively Good",
            AqiCategory::Moderate => "Relatively Moderate",
            AqiCategory::High => "Relatively High",
        }
    }
}

impl std::fmt::Display for AqiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A monitoring station as listed on the air quality tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirStation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub aqi: f64,
    pub pm1: f64,
    pub health_impact: String,
}

impl AirStation {
    pub fn category(&self) -> AqiCategory {
        AqiCategory::for_aqi(self.aqi)
    }

    pub fn formatted_aqi(&self) -> String {
        format!("{:.1}", self.aqi)
    }

    pub fn formatted_pm1(&self) -> String {
        format!("{:.1} µg/m³", self.pm1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aqi_category_bounds() {
        assert_eq!(AqiCategory::for_aqi(0.0), AqiCategory::Good);
        assert_eq!(AqiCategory::for_aqi(9.99), AqiCategory::Good);
        assert_eq!(AqiCategory::for_aqi(10.0), AqiCategory::Moderate);
        assert_eq!(AqiCategory::for_aqi(40.0), AqiCategory::Moderate);
        assert_eq!(AqiCategory::for_aqi(40.1), AqiCategory::High);
        assert_eq!(AqiCategory::for_aqi(f64::NAN), AqiCategory::High);
    }

    #[test]
    fn test_category_labels() {
        assert_eq!(AqiCategory::Good.to_string(), "Relatively Good");
        assert_eq!(AqiCategory::High.label(), "Relatively High");
    }
}
