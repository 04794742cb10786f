//! Collaborators the navigation engine consumes but does not own.
//!
//! - [`StarSystemProvider`] - star system, station and route lookups
//! - [`TravellerState`] - where the commander, their ship and carrier are
//! - [`MissionSource`] - the current mission list
//!
//! Implementations may block on network or cache access. The engine calls
//! them synchronously and applies no retry or timeout of its own.

use serde::{Deserialize, Serialize};

use crate::mission::Mission;
use crate::waypoint::{MarketId, SystemAddress, Waypoint};

/// Facilities a service query can search for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationService {
    EncodedMaterialTrader,
    ManufacturedMaterialTrader,
    RawMaterialTrader,
    GuardianTechBroker,
    HumanTechBroker,
    InterstellarFactors,
    Facilitator,
    BlackMarket,
}

/// Landing pad sizes, ordered small to large.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandingPadSize {
    Small,
    Medium,
    Large,
}

/// A station as known to the data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_id: Option<MarketId>,
    pub system_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_address: Option<SystemAddress>,
    /// Supercruise distance from the arrival star, in light-seconds.
    pub distance_from_arrival_ls: f64,
    pub max_pad: LandingPadSize,
    #[serde(default)]
    pub planetary: bool,
    #[serde(default)]
    pub services: Vec<StationService>,
}

impl Station {
    pub fn offers(&self, service: StationService) -> bool {
        self.services.contains(&service)
    }

    /// Whether a ship requiring `pad` can dock here.
    pub fn fits(&self, pad: Option<LandingPadSize>) -> bool {
        pad.map_or(true, |required| self.max_pad >= required)
    }
}

/// What a nearest-match search is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchCategory {
    /// A star that can be fuel-scooped (KGBFOAM classes).
    ScoopableStar,
    /// A station offering the given service.
    Facility(StationService),
}

/// Structured search filter sent to the data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub category: SearchCategory,
    /// Maximum distance from the starting system, in light-years.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_radius_ly: Option<f64>,
    /// Maximum station distance from the arrival star, in light-seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_distance_from_arrival_ls: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landing_pad: Option<LandingPadSize>,
    /// Prefer orbital stations over planetary ports within the same system.
    #[serde(default)]
    pub prefer_orbital: bool,
}

impl SearchFilter {
    pub fn scoopable(max_radius_ly: Option<f64>) -> Self {
        Self {
            category: SearchCategory::ScoopableStar,
            max_radius_ly,
            max_distance_from_arrival_ls: None,
            landing_pad: None,
            prefer_orbital: false,
        }
    }

    pub fn facility(service: StationService, max_distance_from_arrival_ls: f64) -> Self {
        Self {
            category: SearchCategory::Facility(service),
            max_radius_ly: None,
            max_distance_from_arrival_ls: Some(max_distance_from_arrival_ls),
            landing_pad: None,
            prefer_orbital: false,
        }
    }

    pub fn with_landing_pad(mut self, pad: Option<LandingPadSize>) -> Self {
        self.landing_pad = pad;
        self
    }

    pub fn with_prefer_orbital(mut self, prefer_orbital: bool) -> Self {
        self.prefer_orbital = prefer_orbital;
        self
    }

    /// Whether a station satisfies the facility constraints of this filter.
    pub fn accepts_station(&self, station: &Station) -> bool {
        let SearchCategory::Facility(service) = self.category else {
            return false;
        };
        station.offers(service)
            && station.fits(self.landing_pad)
            && self
                .max_distance_from_arrival_ls
                .map_or(true, |limit| station.distance_from_arrival_ls <= limit)
    }
}

/// Result of a nearest-match search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchMatch {
    /// The matching system, with the station filled in for facility searches.
    pub waypoint: Waypoint,
    pub distance_from_arrival_ls: Option<f64>,
}

/// Multi-hop route plotting requests delegated to the data provider.
#[derive(Debug, Clone, PartialEq)]
pub enum PlotRequest {
    /// Route along the neutron highway for a ship with the given jump range.
    Neutron {
        from: Waypoint,
        to: String,
        jump_range_ly: f64,
    },
    /// Fleet carrier jump route; used capacity affects fuel only.
    Carrier {
        from: Waypoint,
        to: String,
        used_capacity: u32,
    },
}

impl PlotRequest {
    pub fn destination(&self) -> &str {
        match self {
            PlotRequest::Neutron { to, .. } | PlotRequest::Carrier { to, .. } => to,
        }
    }
}

/// Star system and station lookups.
pub trait StarSystemProvider: Send + Sync {
    /// Look up a system by name. Returns `None` if unknown.
    fn system_by_name(&self, name: &str) -> Option<Waypoint>;

    /// Batch lookup; unknown names are skipped.
    fn systems_by_name(&self, names: &[String]) -> Vec<Waypoint> {
        names
            .iter()
            .filter_map(|name| self.system_by_name(name))
            .collect()
    }

    fn system_by_address(&self, address: SystemAddress) -> Option<Waypoint>;

    fn station_by_name(&self, system: &str, station: &str) -> Option<Station>;

    fn station_by_market_id(&self, market_id: MarketId) -> Option<Station>;

    /// Single nearest system (or station) matching the filter.
    fn nearest_match(&self, from: &Waypoint, filter: &SearchFilter) -> Option<SearchMatch>;

    /// Plot a multi-hop route, starting with the `from` system.
    fn plot_route(&self, request: &PlotRequest) -> Option<Vec<Waypoint>>;
}

/// The commander's ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    #[serde(default)]
    pub name: String,
    pub jump_range_ly: f64,
    pub landing_pad: LandingPadSize,
}

/// The commander's fleet carrier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetCarrier {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_system: Option<String>,
    #[serde(default)]
    pub used_capacity: u32,
}

/// Read-only accessors for the traveller's live position.
pub trait TravellerState: Send + Sync {
    fn current_system(&self) -> Option<Waypoint>;
    fn current_ship(&self) -> Option<Ship>;
    fn fleet_carrier(&self) -> Option<FleetCarrier>;
}

/// Read-only mission list.
pub trait MissionSource: Send + Sync {
    fn missions(&self) -> Vec<Mission>;
}

/// Fixed traveller state and missions, e.g. loaded from a snapshot file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TravellerSnapshot {
    pub current_system: Option<Waypoint>,
    pub ship: Option<Ship>,
    pub carrier: Option<FleetCarrier>,
    pub missions: Vec<Mission>,
}

impl TravellerState for TravellerSnapshot {
    fn current_system(&self) -> Option<Waypoint> {
        self.current_system.clone()
    }

    fn current_ship(&self) -> Option<Ship> {
        self.ship.clone()
    }

    fn fleet_carrier(&self) -> Option<FleetCarrier> {
        self.carrier.clone()
    }
}

impl MissionSource for TravellerSnapshot {
    fn missions(&self) -> Vec<Mission> {
        self.missions.clone()
    }
}
