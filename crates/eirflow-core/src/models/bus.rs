use serde::{Deserialize, Serialize};

/// A single `[lat, lng, intensity]` sample of the bus heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatPoint {
    pub lat: f64,
    pub lng: f64,
    pub intensity: f64,
}

impl HeatPoint {
    /// Build from a raw heatmap row. Rows without a usable position are
    /// dropped; a missing or null intensity counts as 1.
    pub fn from_row(row: &[Option<f64>]) -> Option<Self> {
        match row {
            [Some(lat), Some(lng), rest @ ..] => Some(Self {
                lat: *lat,
                lng: *lng,
                intensity: rest.first().copied().flatten().unwrap_or(1.0),
            }),
            _ => None,
        }
    }
}

/// A cluster of heatmap samples within the congestion radius of its centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CongestionZone {
    /// 1-based, in creation order.
    pub id: usize,
    pub center: (f64, f64),
    pub points: Vec<HeatPoint>,
}

impl CongestionZone {
    pub fn bus_count(&self) -> usize {
        self.points.len()
    }

    pub fn total_intensity(&self) -> f64 {
        self.points.iter().map(|p| p.intensity).sum()
    }

    pub fn label(&self) -> String {
        format!("Zone {} ({} buses)", self.id, self.bus_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heat_point_from_row() {
        assert_eq!(
            HeatPoint::from_row(&[Some(53.3), Some(-6.2), Some(0.8)]),
            Some(HeatPoint { lat: 53.3, lng: -6.2, intensity: 0.8 })
        );
        assert_eq!(
            HeatPoint::from_row(&[Some(53.3), Some(-6.2)]).map(|p| p.intensity),
            Some(1.0)
        );
        assert_eq!(
            HeatPoint::from_row(&[Some(53.3), Some(-6.2), None]).map(|p| p.intensity),
            Some(1.0)
        );
        assert_eq!(HeatPoint::from_row(&[None, Some(-6.2), Some(0.8)]), None);
        assert_eq!(HeatPoint::from_row(&[Some(53.3)]), None);
        assert_eq!(HeatPoint::from_row(&[]), None);
    }
}
