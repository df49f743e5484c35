use crate::models::{
    AirStation, BikeStation, DashboardResponse, EventInfo, HeatPoint, PedestrianPoint, RouteCoord,
    RouteKind, RoutePayload, RoutePlan,
};

use super::{air, bikes, bus, events, pedestrian};

/// Overlay layers that can be shown alongside a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Aqi,
    Heatmap,
    Events,
    BikeStands,
    Pedestrian,
}

impl Layer {
    pub const ALL: [Layer; 5] = [
        Layer::Aqi,
        Layer::Heatmap,
        Layer::Events,
        Layer::BikeStands,
        Layer::Pedestrian,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Layer::Aqi => "AQI",
            Layer::Heatmap => "Heatmap",
            Layer::Events => "Events",
            Layer::BikeStands => "Bike stands",
            Layer::Pedestrian => "Pedestrian",
        }
    }
}

/// Which overlay layers are switched on. All start off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerToggles {
    pub aqi: bool,
    pub heatmap: bool,
    pub events: bool,
    pub bike_stands: bool,
    pub pedestrian: bool,
}

impl LayerToggles {
    pub fn is_on(&self, layer: Layer) -> bool {
        match layer {
            Layer::Aqi => self.aqi,
            Layer::Heatmap => self.heatmap,
            Layer::Events => self.events,
            Layer::BikeStands => self.bike_stands,
            Layer::Pedestrian => self.pedestrian,
        }
    }

    pub fn toggle(&mut self, layer: Layer) {
        let flag = match layer {
            Layer::Aqi => &mut self.aqi,
            Layer::Heatmap => &mut self.heatmap,
            Layer::Events => &mut self.events,
            Layer::BikeStands => &mut self.bike_stands,
            Layer::Pedestrian => &mut self.pedestrian,
        };
        *flag = !*flag;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteFilter {
    #[default]
    All,
    Only(RouteKind),
}

impl RouteFilter {
    pub fn shows(&self, kind: RouteKind) -> bool {
        match self {
            RouteFilter::All => true,
            RouteFilter::Only(only) => *only == kind,
        }
    }

    /// All -> Normal -> Sustainable -> Clean -> All
    pub fn next(&self) -> Self {
        match self {
            RouteFilter::All => RouteFilter::Only(RouteKind::Normal),
            RouteFilter::Only(RouteKind::Normal) => RouteFilter::Only(RouteKind::Sustainable),
            RouteFilter::Only(RouteKind::Sustainable) => RouteFilter::Only(RouteKind::Clean),
            RouteFilter::Only(RouteKind::Clean) => RouteFilter::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RouteFilter::All => "All routes",
            RouteFilter::Only(kind) => kind.label(),
        }
    }
}

/// Everything the route planner shows for one search.
#[derive(Debug, Clone, Default)]
pub struct RouteResult {
    pub plan: RoutePlan,
    pub air: Vec<AirStation>,
    pub heat: Vec<HeatPoint>,
    pub events: Vec<EventInfo>,
    pub bikes: Vec<BikeStation>,
    pub pedestrian: Vec<PedestrianPoint>,
}

impl RouteResult {
    /// Number of items the given layer would draw.
    pub fn layer_len(&self, layer: Layer) -> usize {
        match layer {
            Layer::Aqi => self.air.len(),
            Layer::Heatmap => self.heat.len(),
            Layer::Events => self.events.len(),
            Layer::BikeStands => self.bikes.len(),
            Layer::Pedestrian => self.pedestrian.len(),
        }
    }
}

fn polyline(payload: Option<RoutePayload>) -> Vec<(f64, f64)> {
    payload
        .map(|p| p.route.into_iter().map(RouteCoord::to_coordinate).collect())
        .unwrap_or_default()
}

/// Build the route result from a route-bearing dashboard payload. Overlay
/// sections that are missing or malformed come back empty.
pub fn route_result(response: DashboardResponse) -> RouteResult {
    let bikes = match (&response.bike_notifications, &response.predictions) {
        (Some(n), Some(p)) => bikes::merge_stations(&n.notifications, &p.data).unwrap_or_default(),
        _ => Vec::new(),
    };

    RouteResult {
        plan: RoutePlan {
            normal: polyline(response.normal_route),
            sustainable: polyline(response.sustainable_route),
            clean: polyline(response.clean_route),
        },
        air: air::stations(response.air_pollution).unwrap_or_default(),
        heat: bus::heat_points(response.bus_heatmap).unwrap_or_default(),
        events: events::process(response.events).unwrap_or_default(),
        bikes,
        pedestrian: pedestrian::process(response.pedestrian).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_toggles() {
        let mut toggles = LayerToggles::default();
        assert!(Layer::ALL.iter().all(|l| !toggles.is_on(*l)));
        toggles.toggle(Layer::Heatmap);
        assert!(toggles.is_on(Layer::Heatmap));
        assert!(!toggles.is_on(Layer::Aqi));
        toggles.toggle(Layer::Heatmap);
        assert!(!toggles.heatmap);
    }

    #[test]
    fn test_route_filter_cycle() {
        let mut filter = RouteFilter::default();
        assert!(RouteKind::ALL.iter().all(|k| filter.shows(*k)));
        filter = filter.next();
        assert!(filter.shows(RouteKind::Normal));
        assert!(!filter.shows(RouteKind::Clean));
        filter = filter.next().next().next();
        assert_eq!(filter, RouteFilter::All);
    }

    #[test]
    fn test_route_result_from_payload() {
        let response: DashboardResponse = serde_json::from_str(
            r#"{
                "normal_route": {"route": [[53.1, -6.1], [53.2, -6.2]]},
                "clean_route": {"route": [{"lat": 53.1, "lon": -6.1}]},
                "bus_heatmap": [[53.3, -6.2, 0.8]],
                "pedestrian": [{"data": "broken"}]
            }"#,
        )
        .unwrap();
        let result = route_result(response);
        assert_eq!(result.plan.normal, vec![(53.1, -6.1), (53.2, -6.2)]);
        assert!(result.plan.sustainable.is_empty());
        assert_eq!(result.plan.clean, vec![(53.1, -6.1)]);
        assert_eq!(result.layer_len(Layer::Heatmap), 1);
        assert_eq!(result.layer_len(Layer::Pedestrian), 0);
        assert_eq!(result.layer_len(Layer::Events), 0);
    }
}
