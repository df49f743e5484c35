use serde::{Deserialize, Serialize};

use super::de;

/// A `(lat, lon)` pair.
pub type Coordinate = (f64, f64);

/// Route vertices arrive either as `[lat, lon]` arrays or `{lat, lon}`
/// objects depending on the routing backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouteCoord {
    Pair([f64; 2]),
    Object { lat: f64, lon: f64 },
}

impl RouteCoord {
    pub fn to_coordinate(self) -> Coordinate {
        match self {
            RouteCoord::Pair([lat, lon]) => (lat, lon),
            RouteCoord::Object { lat, lon } => (lat, lon),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
    Normal,
    Sustainable,
    Clean,
}

impl RouteKind {
    pub const ALL: [RouteKind; 3] = [RouteKind::Normal, RouteKind::Sustainable, RouteKind::Clean];

    pub fn label(&self) -> &'static str {
        match self {
            RouteKind::Normal => "Normal",
            RouteKind::Sustainable => "Sustainable",
            RouteKind::Clean => "Clean",
        }
    }
}

/// The three polylines returned for a start/end pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutePlan {
    pub normal: Vec<Coordinate>,
    pub sustainable: Vec<Coordinate>,
    pub clean: Vec<Coordinate>,
}

impl RoutePlan {
    pub fn route(&self, kind: RouteKind) -> &[Coordinate] {
        match kind {
            RouteKind::Normal => &self.normal,
            RouteKind::Sustainable => &self.sustainable,
            RouteKind::Clean => &self.clean,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.normal.is_empty() && self.sustainable.is_empty() && self.clean.is_empty()
    }

    /// Polyline length in meters.
    pub fn length_meters(&self, kind: RouteKind) -> f64 {
        self.route(kind)
            .windows(2)
            .map(|w| crate::utils::geo::haversine_meters(w[0], w[1]))
            .sum()
    }
}

/// A geocoding result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub place_id: Option<String>,
    pub display_name: String,
    #[serde(default, deserialize_with = "de::opt_lenient_f64")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "de::opt_lenient_f64")]
    pub lon: Option<f64>,
}

impl Place {
    pub fn coordinate(&self) -> Option<Coordinate> {
        Some((self.lat?, self.lon?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_coord_shapes() {
        let coords: Vec<RouteCoord> =
            serde_json::from_str(r#"[[53.1, -6.2], {"lat": 53.2, "lon": -6.3}]"#).unwrap();
        let pairs: Vec<Coordinate> = coords.into_iter().map(RouteCoord::to_coordinate).collect();
        assert_eq!(pairs, vec![(53.1, -6.2), (53.2, -6.3)]);
    }

    #[test]
    fn test_place_parses_string_coordinates() {
        let place: Place = serde_json::from_str(
            r#"{"place_id": 123, "display_name": "Trinity College, Dublin", "lat": "53.3438", "lon": "-6.2546"}"#,
        )
        .unwrap();
        assert_eq!(place.place_id.as_deref(), Some("123"));
        assert_eq!(place.coordinate(), Some((53.3438, -6.2546)));
    }

    #[test]
    fn test_route_length() {
        let plan = RoutePlan {
            normal: vec![(53.0, -6.0), (54.0, -6.0)],
            ..Default::default()
        };
        assert!((plan.length_meters(RouteKind::Normal) - 111_195.0).abs() < 100.0);
        assert_eq!(plan.length_meters(RouteKind::Clean), 0.0);
        assert!(!plan.is_empty());
    }
}
