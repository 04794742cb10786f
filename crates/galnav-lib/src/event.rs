//! The value every resolver produces and the service hands to its callers.

use serde::Serialize;

use crate::mission::MissionId;
use crate::query::QueryType;
use crate::route::RouteCollection;
use crate::waypoint::{MarketId, SystemAddress};

/// Result of a successful query resolution.
///
/// `count` depends on the query: stops for a mission circuit, jumps for a
/// plotted route, light-seconds from arrival for a service search, and the
/// number of missions served for single-destination mission queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteDetailsEvent {
    pub query_type: QueryType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_address: Option<SystemAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_id: Option<MarketId>,
    pub route: RouteCollection,
    pub count: u64,
    pub mission_ids: Vec<MissionId>,
    /// Closed-cycle length of the optimized tour, for mission circuits.
    ///
    /// The route itself is the open walk from the current system, so its
    /// `total_distance` omits the closing leg.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tour_distance: Option<f64>,
}

impl RouteDetailsEvent {
    /// Event targeting the route's next unvisited stop.
    pub fn for_route(query_type: QueryType, route: RouteCollection, count: u64) -> Self {
        let target = route.next_unvisited().or_else(|| route.final_destination());
        let system = target.map(|wp| wp.system_name.clone());
        let station = target.and_then(|wp| wp.station_name.clone());
        let system_address = target.and_then(|wp| wp.system_address);
        let market_id = target.and_then(|wp| wp.market_id);
        let mission_ids = target.map(|wp| wp.mission_ids.clone()).unwrap_or_default();

        Self {
            query_type,
            system,
            station,
            system_address,
            market_id,
            route,
            count,
            mission_ids,
            tour_distance: None,
        }
    }

    /// Replace the mission ids attached to the event.
    pub fn with_mission_ids(mut self, mission_ids: Vec<MissionId>) -> Self {
        self.mission_ids = mission_ids;
        self
    }

    pub fn with_tour_distance(mut self, tour_distance: f64) -> Self {
        self.tour_distance = Some(tour_distance);
        self
    }

    /// Same event carrying a stored route, retargeted at its next stop.
    ///
    /// Only plotted routes and mission circuits are ever swapped, so the count
    /// is recomputed as stops or jumps. The tour length described the fresh
    /// computation and is dropped.
    pub(crate) fn with_route(self, route: RouteCollection) -> Self {
        let count = match self.query_type {
            QueryType::Route => route.len(),
            _ => route.jump_count(),
        };
        Self::for_route(self.query_type, route, count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SystemPosition;
    use crate::waypoint::Waypoint;

    #[test]
    fn targets_next_unvisited_stop() {
        let mut dest = Waypoint::at("Lave", 2, SystemPosition::new(5.0, 0.0, 0.0))
            .with_station("Lave Station", Some(128));
        dest.mission_ids = vec![7];
        let route = RouteCollection::from_waypoints(vec![
            Waypoint::at("Sol", 1, SystemPosition::new(0.0, 0.0, 0.0)).into_visited(),
            dest,
        ]);

        let event = RouteDetailsEvent::for_route(QueryType::Nearest, route, 1);
        assert_eq!(event.system.as_deref(), Some("Lave"));
        assert_eq!(event.station.as_deref(), Some("Lave Station"));
        assert_eq!(event.system_address, Some(2));
        assert_eq!(event.market_id, Some(128));
        assert_eq!(event.mission_ids, vec![7]);
    }

    #[test]
    fn empty_route_has_no_target() {
        let event = RouteDetailsEvent::for_route(QueryType::Cancel, RouteCollection::new(), 0);
        assert!(event.system.is_none());
        assert!(event.system_address.is_none());
        assert!(event.mission_ids.is_empty());
    }

    fn line(names: &[&str]) -> RouteCollection {
        RouteCollection::from_waypoints(
            names
                .iter()
                .enumerate()
                .map(|(i, name)| Waypoint::at(*name, i as u64 + 1, SystemPosition::new(i as f64, 0.0, 0.0)))
                .collect(),
        )
    }

    #[test]
    fn swapped_route_recounts_jumps() {
        let fresh = RouteDetailsEvent::for_route(QueryType::Neutron, line(&["Sol", "Hop", "Dock"]), 2);
        let kept = fresh.with_route(line(&["Sol", "Dock"]));
        assert_eq!(kept.count, 1);
        assert_eq!(kept.system.as_deref(), Some("Sol"));
    }

    #[test]
    fn swapped_circuit_recounts_stops() {
        let fresh = RouteDetailsEvent::for_route(QueryType::Route, line(&["Sol", "A", "B", "C"]), 4)
            .with_tour_distance(12.0);
        let kept = fresh.with_route(line(&["Sol", "A", "C"]));
        assert_eq!(kept.count, 3);
        assert!(kept.tour_distance.is_none());
    }
}
