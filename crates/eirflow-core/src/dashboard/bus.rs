use crate::models::{CongestionZone, HeatPoint};
use crate::utils::geo::haversine_meters;

/// Points within this distance of a zone centre join the zone.
pub const CONGESTION_RADIUS_M: f64 = 400.0;

/// Zones need at least this many points to count as congested.
pub const MIN_BUSES_FOR_CONGESTION: usize = 10;

pub const MAX_CONGESTION_ZONES: usize = 5;

/// Heatmap rows to points. `None` when the payload has no heatmap.
pub fn heat_points(rows: Option<Vec<Vec<Option<f64>>>>) -> Option<Vec<HeatPoint>> {
    rows.map(|rows| rows.iter().filter_map(|row| HeatPoint::from_row(row)).collect())
}

/// Greedy clustering: each point joins the first zone whose centre is within
/// the congestion radius, otherwise it starts a new zone centred on itself.
/// Zone ids are assigned in creation order, before filtering.
pub fn congestion_zones(points: &[HeatPoint]) -> Vec<CongestionZone> {
    let mut zones: Vec<CongestionZone> = Vec::new();

    for point in points {
        let here = (point.lat, point.lng);
        match zones
            .iter_mut()
            .find(|zone| haversine_meters(zone.center, here) <= CONGESTION_RADIUS_M)
        {
            Some(zone) => zone.points.push(*point),
            None => {
                let id = zones.len() + 1;
                zones.push(CongestionZone {
                    id,
                    center: here,
                    points: vec![*point],
                });
            }
        }
    }

    zones
        .into_iter()
        .filter(|zone| zone.bus_count() >= MIN_BUSES_FOR_CONGESTION)
        .take(MAX_CONGESTION_ZONES)
        .collect()
}

/// Peak intensity in the heatmap, used to scale the density bars.
pub fn max_intensity(points: &[HeatPoint]) -> f64 {
    points.iter().map(|p| p.intensity).fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(lat: f64, lng: f64, n: usize) -> Vec<HeatPoint> {
        (0..n)
            .map(|i| HeatPoint {
                // ~11 m apart, all well inside the radius
                lat: lat + i as f64 * 0.0001,
                lng,
                intensity: 1.0,
            })
            .collect()
    }

    #[test]
    fn test_heat_points_missing_payload() {
        assert!(heat_points(None).is_none());
        let points = heat_points(Some(vec![
            vec![Some(53.3), Some(-6.2), Some(0.5)],
            vec![Some(1.0)],
            vec![Some(53.4), Some(-6.1), None],
        ])).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].intensity, 1.0);
    }

    #[test]
    fn test_zones_require_minimum_points() {
        let mut points = cluster(53.35, -6.26, 10);
        points.extend(cluster(53.30, -6.20, 9));
        let zones = congestion_zones(&points);
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].id, 1);
        assert_eq!(zones[0].bus_count(), 10);
        assert_eq!(zones[0].center, (53.35, -6.26));
    }

    #[test]
    fn test_zone_ids_follow_creation_order() {
        let mut points = cluster(53.30, -6.20, 3);
        points.extend(cluster(53.35, -6.26, 12));
        let zones = congestion_zones(&points);
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0].id, 2);
        assert_eq!(zones[0].label(), "Zone 2 (12 buses)");
    }

    #[test]
    fn test_at_most_five_zones() {
        let points: Vec<HeatPoint> = (0..7)
            .flat_map(|i| cluster(53.0 + i as f64 * 0.1, -6.0, 10))
            .collect();
        let zones = congestion_zones(&points);
        assert_eq!(zones.len(), MAX_CONGESTION_ZONES);
        let ids: Vec<usize> = zones.iter().map(|z| z.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_max_intensity() {
        assert_eq!(max_intensity(&[]), 0.0);
        let points = vec![
            HeatPoint { lat: 0.0, lng: 0.0, intensity: 0.3 },
            HeatPoint { lat: 0.0, lng: 0.0, intensity: 0.9 },
        ];
        assert_eq!(max_intensity(&points), 0.9);
    }
}
