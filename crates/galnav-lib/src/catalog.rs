//! In-memory star catalogue backing the [`StarSystemProvider`] trait.
//!
//! The catalogue is a JSON document listing systems (name, address,
//! coordinates, star flags) and stations (services, pad size, distance from
//! the arrival star). Radius searches go through a KD-tree over system
//! coordinates; everything else is a map or a linear scan.
//!
//! ```json
//! {
//!   "systems": [
//!     {"name": "Sol", "address": 10477373803, "x": 0.0, "y": 0.0, "z": 0.0, "scoopable": true}
//!   ],
//!   "stations": [
//!     {"name": "Abraham Lincoln", "market_id": 128016640, "system_name": "Sol",
//!      "distance_from_arrival_ls": 497.0, "max_pad": "large", "services": ["black_market"]}
//!   ]
//! }
//! ```
//!
//! Route plotting is a greedy jump planner: from each hop it jumps to the
//! in-range system closest to the goal. Neutron stars multiply the jump range
//! of the next jump by [`NEUTRON_BOOST`]; carrier jumps use a fixed range.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::geometry::{compare_distance, SystemPosition};
use crate::provider::{
    PlotRequest, SearchCategory, SearchFilter, SearchMatch, StarSystemProvider, Station,
};
use crate::waypoint::{MarketId, SystemAddress, Waypoint};

/// KD-tree bucket size (kiddo default).
const BUCKET_SIZE: usize = 32;

/// Maximum fleet carrier jump, in light-years.
pub const CARRIER_JUMP_RANGE_LY: f64 = 500.0;

/// Jump range multiplier when leaving a neutron star.
pub const NEUTRON_BOOST: f64 = 4.0;

/// Minimum Jaro-Winkler similarity for a name suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// A star system record in the catalogue file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSystem {
    pub name: String,
    pub address: SystemAddress,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Primary star can be fuel-scooped.
    #[serde(default)]
    pub scoopable: bool,
    /// Primary star is a neutron star.
    #[serde(default)]
    pub neutron: bool,
}

impl CatalogSystem {
    pub fn position(&self) -> SystemPosition {
        SystemPosition::new(self.x, self.y, self.z)
    }

    pub fn to_waypoint(&self) -> Waypoint {
        let mut waypoint = Waypoint::at(self.name.clone(), self.address, self.position());
        waypoint.is_scoopable = self.scoopable;
        waypoint.has_neutron_star = self.neutron;
        waypoint
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    systems: Vec<CatalogSystem>,
    #[serde(default)]
    stations: Vec<Station>,
}

/// Star systems and stations, indexed for lookup and radius search.
pub struct StarCatalog {
    systems: Vec<CatalogSystem>,
    stations: Vec<Station>,
    name_to_index: HashMap<String, usize>,
    address_to_index: HashMap<SystemAddress, usize>,
    tree: KdTree<f32, usize, 3, BUCKET_SIZE, u32>,
}

/// Load a catalogue from a JSON file.
pub fn load_catalog(path: &Path) -> Result<StarCatalog> {
    let bytes = fs::read(path)?;
    let file: CatalogFile = serde_json::from_slice(&bytes).map_err(|source| Error::Json {
        path: Some(path.to_path_buf()),
        source,
    })?;
    let catalog = StarCatalog::new(file.systems, file.stations);
    info!(
        path = %path.display(),
        systems = catalog.len(),
        stations = catalog.stations.len(),
        "loaded star catalogue"
    );
    Ok(catalog)
}

impl StarCatalog {
    /// Build a catalogue. Later systems with an already seen name or address
    /// are dropped; stations missing a system address inherit it by name.
    pub fn new(systems: Vec<CatalogSystem>, stations: Vec<Station>) -> Self {
        let mut kept = Vec::with_capacity(systems.len());
        let mut name_to_index = HashMap::new();
        let mut address_to_index = HashMap::new();

        for system in systems {
            let key = system.name.to_lowercase();
            if name_to_index.contains_key(&key) || address_to_index.contains_key(&system.address) {
                warn!(system = %system.name, address = system.address, "duplicate catalogue entry ignored");
                continue;
            }
            let index = kept.len();
            name_to_index.insert(key, index);
            address_to_index.insert(system.address, index);
            kept.push(system);
        }

        let mut tree: KdTree<f32, usize, 3, BUCKET_SIZE, u32> = KdTree::new();
        for (index, system) in kept.iter().enumerate() {
            tree.add(&position_to_coords(&system.position()), index);
        }

        let stations = stations
            .into_iter()
            .map(|mut station| {
                if station.system_address.is_none() {
                    station.system_address = name_to_index
                        .get(&station.system_name.to_lowercase())
                        .map(|&i| kept[i].address);
                }
                station
            })
            .collect();

        Self {
            systems: kept,
            stations,
            name_to_index,
            address_to_index,
            tree,
        }
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    pub fn systems(&self) -> &[CatalogSystem] {
        &self.systems
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// Case-insensitive lookup by name.
    pub fn system(&self, name: &str) -> Option<&CatalogSystem> {
        self.index_of(name).map(|i| &self.systems[i])
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(&name.trim().to_lowercase()).copied()
    }

    /// Like [`StarSystemProvider::system_by_name`], but unknown names are an
    /// error carrying spelling suggestions.
    pub fn require_system(&self, name: &str) -> Result<Waypoint> {
        self.system(name)
            .map(CatalogSystem::to_waypoint)
            .ok_or_else(|| Error::UnknownSystem {
                name: name.to_string(),
                suggestions: self.fuzzy_system_matches(name, 3),
            })
    }

    /// Names similar to `name`, best match first.
    pub fn fuzzy_system_matches(&self, name: &str, limit: usize) -> Vec<String> {
        let needle = name.trim().to_lowercase();
        let mut scored: Vec<(f64, &str)> = self
            .systems
            .iter()
            .map(|s| (strsim::jaro_winkler(&needle, &s.name.to_lowercase()), s.name.as_str()))
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, name)| name.to_string())
            .collect()
    }

    /// Systems within `radius` light-years of `point`, nearest first.
    ///
    /// Equal distances keep catalogue order.
    pub fn within_radius(&self, point: SystemPosition, radius: f64) -> Vec<(usize, f64)> {
        if radius < 0.0 || self.systems.is_empty() {
            return Vec::new();
        }

        let query_point = position_to_coords(&point);
        // f32 rounding can push boundary systems either way; widen, then
        // filter on exact distances.
        let squared_radius = ((radius + 1e-3) * (radius + 1e-3)) as f32;
        let mut neighbours: Vec<(usize, f64)> = self
            .tree
            .within::<SquaredEuclidean>(&query_point, squared_radius)
            .into_iter()
            .map(|neighbour| {
                let index = neighbour.item;
                (index, point.distance_to(&self.systems[index].position()))
            })
            .filter(|(_, distance)| *distance <= radius)
            .collect();
        neighbours.sort_by(|a, b| compare_distance(a.1, b.1).then(a.0.cmp(&b.0)));
        neighbours
    }

    fn nearest_scoopable(&self, from: SystemPosition, radius: Option<f64>) -> Option<usize> {
        match radius {
            Some(radius) => self
                .within_radius(from, radius)
                .into_iter()
                .find(|(index, _)| self.systems[*index].scoopable)
                .map(|(index, _)| index),
            None => self
                .systems
                .iter()
                .enumerate()
                .filter(|(_, s)| s.scoopable)
                .map(|(index, s)| (index, from.distance_to(&s.position())))
                .min_by(|a, b| compare_distance(a.1, b.1))
                .map(|(index, _)| index),
        }
    }

    fn nearest_station(&self, from: SystemPosition, filter: &SearchFilter) -> Option<(usize, &Station)> {
        self.stations
            .iter()
            .filter(|station| filter.accepts_station(station))
            .filter_map(|station| {
                let index = self.index_of(&station.system_name)?;
                let distance = from.distance_to(&self.systems[index].position());
                Some((index, station, distance))
            })
            .filter(|(_, _, distance)| filter.max_radius_ly.map_or(true, |r| *distance <= r))
            .min_by(|a, b| {
                compare_distance(a.2, b.2)
                    .then_with(|| {
                        if filter.prefer_orbital {
                            a.1.planetary.cmp(&b.1.planetary)
                        } else {
                            Ordering::Equal
                        }
                    })
                    .then_with(|| compare_distance(a.1.distance_from_arrival_ls, b.1.distance_from_arrival_ls))
            })
            .map(|(index, station, _)| (index, station))
    }

    /// Greedy jump plan from `from` to `goal`.
    fn greedy_plot(&self, from: &Waypoint, goal: usize, jump_range: f64, neutron_boost: bool) -> Option<Vec<Waypoint>> {
        let Some(mut position) = from.position() else {
            warn!(system = %from.system_name, "cannot plot from a system without coordinates");
            return None;
        };
        let goal_position = self.systems[goal].position();
        let mut current = from
            .system_address
            .and_then(|address| self.address_to_index.get(&address).copied());
        let mut hops = vec![current.map_or_else(|| from.clone(), |i| self.systems[i].to_waypoint())];
        let mut visited: HashSet<usize> = current.into_iter().collect();

        while current != Some(goal) {
            let boosted = neutron_boost && current.is_some_and(|i| self.systems[i].neutron);
            let range = if boosted { jump_range * NEUTRON_BOOST } else { jump_range };
            let remaining = position.distance_to(&goal_position);

            let next = if remaining <= range {
                Some(goal)
            } else {
                self.within_radius(position, range)
                    .into_iter()
                    .filter(|(index, _)| !visited.contains(index))
                    .map(|(index, _)| (index, self.systems[index].position().distance_to(&goal_position)))
                    .filter(|(_, to_goal)| *to_goal < remaining)
                    .min_by(|a, b| compare_distance(a.1, b.1))
                    .map(|(index, _)| index)
            };
            let Some(next) = next else {
                debug!(
                    from = %from.system_name,
                    goal = %self.systems[goal].name,
                    hops = hops.len(),
                    "no system in range makes progress"
                );
                return None;
            };

            visited.insert(next);
            position = self.systems[next].position();
            hops.push(self.systems[next].to_waypoint());
            current = Some(next);
        }
        Some(hops)
    }
}

impl StarSystemProvider for StarCatalog {
    fn system_by_name(&self, name: &str) -> Option<Waypoint> {
        self.system(name).map(CatalogSystem::to_waypoint)
    }

    fn system_by_address(&self, address: SystemAddress) -> Option<Waypoint> {
        self.address_to_index
            .get(&address)
            .map(|&i| self.systems[i].to_waypoint())
    }

    fn station_by_name(&self, system: &str, station: &str) -> Option<Station> {
        self.stations
            .iter()
            .find(|s| s.system_name.eq_ignore_ascii_case(system) && s.name.eq_ignore_ascii_case(station))
            .cloned()
    }

    fn station_by_market_id(&self, market_id: MarketId) -> Option<Station> {
        self.stations
            .iter()
            .find(|s| s.market_id == Some(market_id))
            .cloned()
    }

    fn nearest_match(&self, from: &Waypoint, filter: &SearchFilter) -> Option<SearchMatch> {
        let Some(position) = from.position() else {
            warn!(system = %from.system_name, "cannot search around a system without coordinates");
            return None;
        };
        match filter.category {
            SearchCategory::ScoopableStar => {
                let index = self.nearest_scoopable(position, filter.max_radius_ly)?;
                Some(SearchMatch {
                    waypoint: self.systems[index].to_waypoint(),
                    distance_from_arrival_ls: None,
                })
            }
            SearchCategory::Facility(_) => {
                let (index, station) = self.nearest_station(position, filter)?;
                Some(SearchMatch {
                    waypoint: self.systems[index]
                        .to_waypoint()
                        .with_station(station.name.clone(), station.market_id),
                    distance_from_arrival_ls: Some(station.distance_from_arrival_ls),
                })
            }
        }
    }

    fn plot_route(&self, request: &PlotRequest) -> Option<Vec<Waypoint>> {
        let Some(goal) = self.index_of(request.destination()) else {
            warn!(destination = request.destination(), "plot destination not in catalogue");
            return None;
        };
        match request {
            PlotRequest::Neutron { from, jump_range_ly, .. } => {
                if *jump_range_ly <= 0.0 {
                    warn!(jump_range_ly, "jump range must be positive");
                    return None;
                }
                self.greedy_plot(from, goal, *jump_range_ly, true)
            }
            PlotRequest::Carrier { from, used_capacity, .. } => {
                debug!(used_capacity, "plotting carrier route");
                self.greedy_plot(from, goal, CARRIER_JUMP_RANGE_LY, false)
            }
        }
    }
}

impl std::fmt::Debug for StarCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StarCatalog")
            .field("system_count", &self.systems.len())
            .field("station_count", &self.stations.len())
            .finish()
    }
}

fn position_to_coords(pos: &SystemPosition) -> [f32; 3] {
    [pos.x as f32, pos.y as f32, pos.z as f32]
}
