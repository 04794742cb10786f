//! Ordered routes over [`Waypoint`]s.
//!
//! A [`RouteCollection`] lists stops in the order they are to be visited.
//! Insertion order is preserved exactly; nothing in this module sorts. The
//! collection also remembers a logical origin, used for "distance from where
//! the route was planned" bookkeeping when stops are appended out of travel
//! order.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::geometry::{Coordinates, DistancePolicy, SystemPosition};
use crate::waypoint::{SystemAddress, Waypoint};

/// Ordered sequence of waypoints plus the route's logical origin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteCollection {
    pub waypoints: Vec<Waypoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<SystemPosition>,
}

impl RouteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a collection whose logical origin is the given position.
    pub fn from_origin(origin: Option<SystemPosition>) -> Self {
        Self {
            waypoints: Vec::new(),
            origin,
        }
    }

    /// Build a collection from waypoints already in travel order.
    pub fn from_waypoints(waypoints: Vec<Waypoint>) -> Self {
        let origin = waypoints.first().and_then(Waypoint::position);
        Self { waypoints, origin }
    }

    /// Append a waypoint at the end. Order is caller-determined.
    pub fn push(&mut self, waypoint: Waypoint) {
        self.waypoints.push(waypoint);
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn first(&self) -> Option<&Waypoint> {
        self.waypoints.first()
    }

    /// Last stop of the route.
    pub fn final_destination(&self) -> Option<&Waypoint> {
        self.waypoints.last()
    }

    /// First stop that has not been visited yet.
    pub fn next_unvisited(&self) -> Option<&Waypoint> {
        self.waypoints.iter().find(|wp| !wp.visited)
    }

    /// Number of legs in the route.
    pub fn jump_count(&self) -> usize {
        self.waypoints.len().saturating_sub(1)
    }

    pub fn contains_address(&self, address: SystemAddress) -> bool {
        self.waypoints.iter().any(|wp| wp.has_address(address))
    }

    /// Sum of the distances between consecutive waypoints, in route order.
    ///
    /// Legs touching a waypoint without complete coordinates count as zero.
    pub fn total_distance(&self) -> f64 {
        self.waypoints
            .windows(2)
            .filter_map(|pair| DistancePolicy::TreatAsZero.apply(pair[0].distance_to(&pair[1])))
            .sum()
    }

    /// Straight-line distance between the logical origin and a waypoint.
    pub fn distance_from_origin(&self, waypoint: &Waypoint) -> Option<f64> {
        let origin: Coordinates = self.origin?.into();
        crate::geometry::distance(&origin, &waypoint.coordinates)
    }

    /// Rewrite the logical origin. Member waypoints are left untouched.
    pub fn update_location_data(&mut self, origin: Option<SystemPosition>) {
        self.origin = origin;
    }

    /// Drop repeated systems, keeping the first occurrence of each address.
    ///
    /// Waypoints without an address are compared by name.
    pub fn dedup_by_address(&mut self) {
        let mut seen_addresses = HashSet::new();
        let mut seen_names = HashSet::new();
        self.waypoints.retain(|wp| match wp.system_address {
            Some(address) => seen_addresses.insert(address),
            None => seen_names.insert(wp.system_name.to_ascii_lowercase()),
        });
    }

    /// Fill the per-stop bookkeeping distances for a route about to be
    /// published.
    pub fn finalize(mut self) -> Self {
        let total = self.total_distance();
        let mut travelled = 0.0;
        let mut previous: Option<Coordinates> = None;
        let origin = self.origin;

        for waypoint in &mut self.waypoints {
            if let Some(prev) = previous {
                travelled += DistancePolicy::TreatAsZero
                    .apply(crate::geometry::distance(&prev, &waypoint.coordinates))
                    .unwrap_or(0.0);
            }
            waypoint.distance_travelled = Some(travelled);
            waypoint.distance_remaining = Some((total - travelled).max(0.0));
            waypoint.distance_from_start = origin.and_then(|o| {
                crate::geometry::distance(&o.into(), &waypoint.coordinates)
            });
            previous = Some(waypoint.coordinates);
        }
        self
    }

    /// Copy of this route with every stop up to and including `address`
    /// marked visited. Returns `None` if the system is not on the route.
    pub fn mark_visited_through(&self, address: SystemAddress) -> Option<Self> {
        let position = self.waypoints.iter().position(|wp| wp.has_address(address))?;
        let mut updated = self.clone();
        for waypoint in updated.waypoints.iter_mut().take(position + 1) {
            waypoint.visited = true;
        }
        Some(updated)
    }
}

impl FromIterator<Waypoint> for RouteCollection {
    fn from_iter<I: IntoIterator<Item = Waypoint>>(iter: I) -> Self {
        Self::from_waypoints(iter.into_iter().collect())
    }
}
