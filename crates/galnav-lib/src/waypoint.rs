//! Route stops: a star system, optionally narrowed to a station.

use serde::{Deserialize, Serialize};

use crate::geometry::{distance, Coordinates, SystemPosition};
use crate::mission::MissionId;

/// Unique 64-bit identifier of a star system.
pub type SystemAddress = u64;

/// Numeric identifier of a station market.
pub type MarketId = u64;

/// A single stop in a route: a star system, optionally a station within it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub system_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_address: Option<SystemAddress>,
    #[serde(flatten)]
    pub coordinates: Coordinates,
    #[serde(default)]
    pub visited: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_id: Option<MarketId>,
    /// Missions that are served by stopping here.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mission_ids: Vec<MissionId>,
    #[serde(default)]
    pub is_mission_system: bool,
    #[serde(default)]
    pub is_scoopable: bool,
    #[serde(default)]
    pub has_neutron_star: bool,
    #[serde(default)]
    pub refuel_recommended: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_from_start: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_travelled: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_remaining: Option<f64>,
}

impl Waypoint {
    /// Create an unvisited waypoint for a known system.
    pub fn new(
        system_name: impl Into<String>,
        system_address: Option<SystemAddress>,
        coordinates: Coordinates,
    ) -> Self {
        Self {
            system_name: system_name.into(),
            system_address,
            coordinates,
            visited: false,
            station_name: None,
            market_id: None,
            mission_ids: Vec::new(),
            is_mission_system: false,
            is_scoopable: false,
            has_neutron_star: false,
            refuel_recommended: false,
            distance_from_start: None,
            distance_travelled: None,
            distance_remaining: None,
        }
    }

    /// Convenience constructor for a system with complete coordinates.
    pub fn at(system_name: impl Into<String>, system_address: SystemAddress, position: SystemPosition) -> Self {
        Self::new(system_name, Some(system_address), position.into())
    }

    /// Mark this waypoint as visited.
    pub fn into_visited(mut self) -> Self {
        self.visited = true;
        self
    }

    /// Target a specific station within the system.
    pub fn with_station(mut self, station_name: impl Into<String>, market_id: Option<MarketId>) -> Self {
        self.station_name = Some(station_name.into());
        self.market_id = market_id;
        self
    }

    /// Complete position, if every axis is known.
    pub fn position(&self) -> Option<SystemPosition> {
        self.coordinates.position()
    }

    /// Straight-line distance to another waypoint, `None` when incomparable.
    pub fn distance_to(&self, other: &Waypoint) -> Option<f64> {
        distance(&self.coordinates, &other.coordinates)
    }

    /// Two waypoints name the same system when their addresses match. Without
    /// an address on either side the names are compared case-insensitively.
    pub fn is_same_system(&self, other: &Waypoint) -> bool {
        match (self.system_address, other.system_address) {
            (Some(a), Some(b)) => a == b,
            _ => self.system_name.eq_ignore_ascii_case(&other.system_name),
        }
    }

    /// Whether this waypoint is the system with the given address.
    pub fn has_address(&self, address: SystemAddress) -> bool {
        self.system_address == Some(address)
    }
}
