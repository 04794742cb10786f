//! Multi-stop mission circuit using the repetitive nearest neighbour
//! heuristic.
//!
//! The candidate set is the current system, then every system that serves an
//! eligible mission: origins of return-to-origin missions first, then mission
//! destinations, in mission list order. A nearest-neighbour tour is grown from
//! each permitted starting candidate over a precomputed [`DistanceMatrix`],
//! and the shortest closed tour wins. The winning cycle is then oriented for
//! presentation, which never changes its length:
//!
//! * [`TourShape::Cycle`] leads with the current system, unless the current
//!   system may not start a tour, in which case the tour keeps its own start.
//! * [`TourShape::CycleWithAnchor`] ends at the nominated home system.
//!
//! Systems that are destinations of return-to-origin missions never start a
//! tour. Equal distances always resolve to the candidate seen first.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::Result;
use crate::event::RouteDetailsEvent;
use crate::geometry::SystemPosition;
use crate::mission::{mission_ids_for_system, Mission};
use crate::query::{Query, QueryType};
use crate::route::RouteCollection;
use crate::waypoint::Waypoint;

use super::{QueryResolver, ResolveContext};

/// Symmetric pairwise distances between candidate systems.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    size: usize,
    distances: Vec<f64>,
}

impl DistanceMatrix {
    pub fn from_positions(positions: &[SystemPosition]) -> Self {
        let size = positions.len();
        let mut distances = vec![0.0; size * size];
        for i in 0..size {
            for j in (i + 1)..size {
                let d = positions[i].distance_to(&positions[j]);
                distances[i * size + j] = d;
                distances[j * size + i] = d;
            }
        }
        Self { size, distances }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.distances[from * self.size + to]
    }
}

/// A closed tour over matrix indices.
///
/// `order[0]` is where the walk started; `total_distance` includes the
/// closing leg back to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Tour {
    pub order: Vec<usize>,
    pub total_distance: f64,
}

impl Tour {
    /// Length of the closed cycle through `order`.
    pub fn cycle_length(&self, matrix: &DistanceMatrix) -> f64 {
        let n = self.order.len();
        if n < 2 {
            return 0.0;
        }
        (0..n)
            .map(|i| matrix.get(self.order[i], self.order[(i + 1) % n]))
            .sum()
    }

    pub fn position_of(&self, index: usize) -> Option<usize> {
        self.order.iter().position(|&i| i == index)
    }

    /// Rotate so that the member at `position` comes first.
    pub fn rotate_to_front(&mut self, position: usize) {
        if position < self.order.len() {
            self.order.rotate_left(position);
        }
    }

    /// Rotate so that `index` is the last member.
    pub fn rotate_to_back(&mut self, index: usize) {
        if let Some(position) = self.position_of(index) {
            self.order.rotate_left(position + 1);
        }
    }
}

/// Nearest-neighbour tour from `start`, closed back to `start`.
pub fn nearest_neighbour_tour(matrix: &DistanceMatrix, start: usize) -> Tour {
    let n = matrix.len();
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut total_distance = 0.0;

    visited[start] = true;
    order.push(start);
    let mut current = start;

    while order.len() < n {
        let mut next: Option<(usize, f64)> = None;
        for candidate in 0..n {
            if visited[candidate] {
                continue;
            }
            let d = matrix.get(current, candidate);
            if next.map_or(true, |(_, best)| d < best) {
                next = Some((candidate, d));
            }
        }
        let Some((candidate, d)) = next else { break };
        visited[candidate] = true;
        order.push(candidate);
        total_distance += d;
        current = candidate;
    }

    total_distance += matrix.get(current, start);
    Tour {
        order,
        total_distance,
    }
}

/// Shortest nearest-neighbour tour over every permitted start.
///
/// Returns `None` for fewer than two candidates or when every start is
/// forbidden.
pub fn repetitive_nearest_neighbour(
    matrix: &DistanceMatrix,
    forbidden_starts: &HashSet<usize>,
) -> Option<Tour> {
    if matrix.len() < 2 {
        return None;
    }

    let mut best: Option<Tour> = None;
    for start in (0..matrix.len()).filter(|i| !forbidden_starts.contains(i)) {
        let tour = nearest_neighbour_tour(matrix, start);
        if best
            .as_ref()
            .map_or(true, |b| tour.total_distance < b.total_distance)
        {
            best = Some(tour);
        }
    }
    best
}

/// How the winning cycle is laid out as a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourShape {
    /// No home system; lead from the traveller's position.
    Cycle,
    /// The candidate at this index must be the last stop.
    CycleWithAnchor(usize),
}

/// Mission-relevant systems with resolved positions.
struct Candidates {
    waypoints: Vec<Waypoint>,
    positions: Vec<SystemPosition>,
}

impl Candidates {
    fn push(&mut self, waypoint: Waypoint) -> Option<usize> {
        let Some(position) = waypoint.position() else {
            debug!(system = %waypoint.system_name, "skipping candidate without coordinates");
            return None;
        };
        self.waypoints.push(waypoint);
        self.positions.push(position);
        Some(self.waypoints.len() - 1)
    }

    fn index_of(&self, waypoint: &Waypoint) -> Option<usize> {
        self.waypoints.iter().position(|wp| wp.is_same_system(waypoint))
    }
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
        names.push(name.to_string());
    }
}

/// Names of systems serving eligible missions, origins first.
fn candidate_names(missions: &[Mission]) -> Vec<String> {
    let mut names = Vec::new();
    for mission in missions.iter().filter(|m| m.return_to_origin) {
        push_unique(&mut names, &mission.origin_system);
    }
    for mission in missions {
        for destination in &mission.destination_systems {
            push_unique(&mut names, destination);
        }
    }
    names
}

/// Candidates that may not start a tour.
fn forbidden_starts(candidates: &Candidates, missions: &[Mission]) -> HashSet<usize> {
    candidates
        .waypoints
        .iter()
        .enumerate()
        .filter(|(_, wp)| {
            missions
                .iter()
                .any(|m| m.return_to_origin && m.has_destination(&wp.system_name))
        })
        .map(|(i, _)| i)
        .collect()
}

/// Rotate the tour for presentation according to `shape`.
fn orient(
    tour: &mut Tour,
    shape: TourShape,
    candidates: &Candidates,
    forbidden: &HashSet<usize>,
    current: &Waypoint,
) {
    match shape {
        TourShape::Cycle => {
            let lead = candidates
                .index_of(current)
                .filter(|index| !forbidden.contains(index))
                .and_then(|index| tour.position_of(index));
            if let Some(position) = lead {
                tour.rotate_to_front(position);
            }
        }
        TourShape::CycleWithAnchor(anchor) => tour.rotate_to_back(anchor),
    }
}

/// Mission circuit through every route-eligible mission system.
///
/// The optional first argument names a home system that closes the circuit.
/// `count` is the number of stops, including the current system.
#[derive(Debug, Clone, Default)]
pub struct MissionRouteResolver;

impl QueryResolver for MissionRouteResolver {
    fn query_type(&self) -> QueryType {
        QueryType::Route
    }

    fn resolve(
        &self,
        query: &Query,
        start: &Waypoint,
        ctx: &ResolveContext<'_>,
    ) -> Result<Option<RouteDetailsEvent>> {
        let eligible: Vec<Mission> = ctx
            .missions
            .iter()
            .filter(|m| m.is_active() && m.route_eligible)
            .cloned()
            .collect();

        let mut candidates = Candidates {
            waypoints: Vec::new(),
            positions: Vec::new(),
        };
        candidates.push(start.clone());
        for waypoint in ctx.provider.systems_by_name(&candidate_names(&eligible)) {
            if candidates.index_of(&waypoint).is_none() {
                candidates.push(waypoint);
            }
        }

        let mut shape = TourShape::Cycle;
        if let Some(home_name) = query.arg0() {
            match ctx.provider.system_by_name(home_name) {
                Some(home) if home.is_same_system(start) => {}
                Some(home) => {
                    let anchor = match candidates.index_of(&home) {
                        Some(index) => Some(index),
                        None => candidates.push(home),
                    };
                    if let Some(anchor) = anchor {
                        shape = TourShape::CycleWithAnchor(anchor);
                    }
                }
                None => warn!(system = home_name, "home system unknown; planning an open circuit"),
            }
        }

        let matrix = DistanceMatrix::from_positions(&candidates.positions);
        let forbidden = forbidden_starts(&candidates, &eligible);
        let Some(mut tour) = repetitive_nearest_neighbour(&matrix, &forbidden) else {
            debug!(candidates = matrix.len(), "not enough systems for a mission circuit");
            return Ok(None);
        };
        orient(&mut tour, shape, &candidates, &forbidden, start);
        debug!(
            stops = tour.order.len(),
            total_distance = tour.total_distance,
            ?shape,
            "mission circuit planned"
        );

        let mut route = RouteCollection::from_origin(start.position());
        let starts_here = tour
            .order
            .first()
            .is_some_and(|&i| candidates.waypoints[i].is_same_system(start));
        if !starts_here {
            route.push(start.clone().into_visited());
        }
        for &index in &tour.order {
            route.push(candidates.waypoints[index].clone());
        }
        if let Some(first) = route.waypoints.first_mut() {
            first.visited = true;
        }
        route.dedup_by_address();

        for waypoint in &mut route.waypoints {
            waypoint.mission_ids = mission_ids_for_system(&eligible, &waypoint.system_name);
            waypoint.is_mission_system = !waypoint.mission_ids.is_empty();
        }

        let route = route.finalize();
        let stops = route.len() as u64;
        Ok(Some(
            RouteDetailsEvent::for_route(QueryType::Route, route, stops)
                .with_tour_distance(tour.total_distance),
        ))
    }
}
