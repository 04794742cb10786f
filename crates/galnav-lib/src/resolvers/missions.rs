//! Single-destination mission resolvers.
//!
//! All of these gather candidate systems from the active mission list, pick
//! one, and return a route of the start system plus that destination.
//! Candidate order follows the mission list, and every ranking keeps the
//! first-seen candidate on ties so results are reproducible.

use std::collections::HashMap;

use tracing::debug;

use crate::error::Result;
use crate::event::RouteDetailsEvent;
use crate::geometry::{compare_distance, DistancePolicy};
use crate::mission::{active_missions, Mission, MissionId};
use crate::query::{Query, QueryType};
use crate::waypoint::Waypoint;

use super::{single_destination_route, QueryResolver, ResolveContext};

/// Which end of a distance ranking to pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extreme {
    Nearest,
    Farthest,
}

/// Push `name` unless an equal name (ignoring case) is already present.
fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
        names.push(name.to_string());
    }
}

/// Destination systems of active missions, in mission-list order.
fn destination_names(missions: &[Mission]) -> Vec<String> {
    let mut names = Vec::new();
    for mission in active_missions(missions) {
        for destination in &mission.destination_systems {
            push_unique(&mut names, destination);
        }
    }
    names
}

/// Active missions with `system` among their destinations.
fn destination_mission_ids(missions: &[Mission], system: &str) -> Vec<MissionId> {
    active_missions(missions)
        .filter(|m| m.has_destination(system))
        .map(|m| m.id)
        .collect()
}

/// Pick the nearest or farthest candidate from `start`.
fn select_by_distance(
    start: &Waypoint,
    candidates: Vec<Waypoint>,
    policy: DistancePolicy,
    extreme: Extreme,
) -> Option<Waypoint> {
    let mut best: Option<(f64, Waypoint)> = None;
    for candidate in candidates {
        let Some(distance) = policy.apply(start.distance_to(&candidate)) else {
            debug!(system = %candidate.system_name, "skipping candidate without coordinates");
            continue;
        };
        let better = match &best {
            None => true,
            Some((best_distance, _)) => {
                let ordering = compare_distance(distance, *best_distance);
                match extreme {
                    Extreme::Nearest => ordering.is_lt(),
                    Extreme::Farthest => ordering.is_gt(),
                }
            }
        };
        if better {
            best = Some((distance, candidate));
        }
    }
    best.map(|(_, waypoint)| waypoint)
}

/// Build the event for a mission destination.
fn mission_event(
    query_type: QueryType,
    start: &Waypoint,
    mut destination: Waypoint,
    mission_ids: Vec<MissionId>,
) -> RouteDetailsEvent {
    destination.is_mission_system = true;
    destination.mission_ids = mission_ids.clone();
    let count = mission_ids.len() as u64;
    let route = single_destination_route(start, destination);
    RouteDetailsEvent::for_route(query_type, route, count).with_mission_ids(mission_ids)
}

fn resolve_by_distance(
    query_type: QueryType,
    extreme: Extreme,
    start: &Waypoint,
    ctx: &ResolveContext<'_>,
) -> Option<RouteDetailsEvent> {
    let names = destination_names(ctx.missions);
    if names.is_empty() {
        debug!(query = %query_type, "no active mission destinations");
        return None;
    }
    let candidates = ctx.provider.systems_by_name(&names);
    let destination = select_by_distance(start, candidates, DistancePolicy::Exclude, extreme)?;
    let ids = destination_mission_ids(ctx.missions, &destination.system_name);
    Some(mission_event(query_type, start, destination, ids))
}

/// Closest active mission destination.
#[derive(Debug, Clone, Default)]
pub struct NearestResolver;

impl QueryResolver for NearestResolver {
    fn query_type(&self) -> QueryType {
        QueryType::Nearest
    }

    fn resolve(
        &self,
        _query: &Query,
        start: &Waypoint,
        ctx: &ResolveContext<'_>,
    ) -> Result<Option<RouteDetailsEvent>> {
        Ok(resolve_by_distance(QueryType::Nearest, Extreme::Nearest, start, ctx))
    }
}

/// Most distant active mission destination.
#[derive(Debug, Clone, Default)]
pub struct FarthestResolver;

impl QueryResolver for FarthestResolver {
    fn query_type(&self) -> QueryType {
        QueryType::Farthest
    }

    fn resolve(
        &self,
        _query: &Query,
        start: &Waypoint,
        ctx: &ResolveContext<'_>,
    ) -> Result<Option<RouteDetailsEvent>> {
        Ok(resolve_by_distance(QueryType::Farthest, Extreme::Farthest, start, ctx))
    }
}

/// Destination shared by the most active missions; nearest wins ties.
#[derive(Debug, Clone, Default)]
pub struct MostResolver;

impl QueryResolver for MostResolver {
    fn query_type(&self) -> QueryType {
        QueryType::Most
    }

    fn resolve(
        &self,
        _query: &Query,
        start: &Waypoint,
        ctx: &ResolveContext<'_>,
    ) -> Result<Option<RouteDetailsEvent>> {
        let names = destination_names(ctx.missions);
        let mut counts: HashMap<String, usize> = HashMap::new();
        for name in &names {
            counts.insert(
                name.to_ascii_lowercase(),
                destination_mission_ids(ctx.missions, name).len(),
            );
        }

        let Some(max) = counts.values().copied().max() else {
            debug!("no active mission destinations");
            return Ok(None);
        };

        let tied: Vec<String> = names
            .into_iter()
            .filter(|n| counts.get(&n.to_ascii_lowercase()) == Some(&max))
            .collect();
        let candidates = ctx.provider.systems_by_name(&tied);

        // An unknown distance must not knock a busiest system out of the running.
        let Some(destination) =
            select_by_distance(start, candidates, DistancePolicy::TreatAsZero, Extreme::Nearest)
        else {
            return Ok(None);
        };
        let ids = destination_mission_ids(ctx.missions, &destination.system_name);
        Ok(Some(mission_event(QueryType::Most, start, destination, ids)))
    }
}

/// Destination of the mission that expires soonest.
#[derive(Debug, Clone, Default)]
pub struct ExpiringResolver;

impl QueryResolver for ExpiringResolver {
    fn query_type(&self) -> QueryType {
        QueryType::Expiring
    }

    fn resolve(
        &self,
        _query: &Query,
        start: &Waypoint,
        ctx: &ResolveContext<'_>,
    ) -> Result<Option<RouteDetailsEvent>> {
        let mut expiring: Vec<&Mission> = active_missions(ctx.missions)
            .filter(|m| m.expiry.is_some() && !m.destination_systems.is_empty())
            .collect();
        // Stable: equal expiries keep mission-list order.
        expiring.sort_by_key(|m| m.expiry);

        for mission in expiring {
            let candidates = ctx.provider.systems_by_name(&mission.destination_systems);
            if let Some(destination) =
                select_by_distance(start, candidates, DistancePolicy::TreatAsZero, Extreme::Nearest)
            {
                let ids = destination_mission_ids(ctx.missions, &destination.system_name);
                return Ok(Some(mission_event(QueryType::Expiring, start, destination, ids)));
            }
            debug!(mission = mission.id, "expiring mission has no known destination");
        }
        Ok(None)
    }
}

/// Nearest origin system a return-to-origin mission must go back to.
#[derive(Debug, Clone, Default)]
pub struct SourceResolver;

impl QueryResolver for SourceResolver {
    fn query_type(&self) -> QueryType {
        QueryType::Source
    }

    fn resolve(
        &self,
        _query: &Query,
        start: &Waypoint,
        ctx: &ResolveContext<'_>,
    ) -> Result<Option<RouteDetailsEvent>> {
        let mut names = Vec::new();
        for mission in active_missions(ctx.missions).filter(|m| m.return_to_origin) {
            push_unique(&mut names, &mission.origin_system);
        }
        if names.is_empty() {
            debug!("no return-to-origin missions");
            return Ok(None);
        }

        let candidates = ctx.provider.systems_by_name(&names);
        let Some(destination) =
            select_by_distance(start, candidates, DistancePolicy::Exclude, Extreme::Nearest)
        else {
            return Ok(None);
        };
        let ids: Vec<MissionId> = active_missions(ctx.missions)
            .filter(|m| m.return_to_origin && m.has_origin(&destination.system_name))
            .map(|m| m.id)
            .collect();
        Ok(Some(mission_event(QueryType::Source, start, destination, ids)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NavigationConfig;
    use crate::resolvers::test_support::{context, missions, traveller, FakeProvider};

    fn provider() -> FakeProvider {
        FakeProvider::default()
            .with_system("Home", 1, [0.0, 0.0, 0.0])
            .with_system("Near", 2, [5.0, 0.0, 0.0])
            .with_system("Far", 3, [12.0, 0.0, 0.0])
            .with_system("AlsoNear", 4, [0.0, 5.0, 0.0])
    }

    fn resolve(
        resolver: &dyn QueryResolver,
        provider: &FakeProvider,
        mission_list: &[Mission],
    ) -> Option<RouteDetailsEvent> {
        let start = provider.system("Home");
        let state = traveller(start.clone());
        let config = NavigationConfig::default();
        let ctx = context(provider, &state, mission_list, &config);
        resolver
            .resolve(&Query::new(resolver.query_type()), &start, &ctx)
            .expect("resolver does not fault")
    }

    #[test]
    fn nearest_picks_closest_destination() {
        let provider = provider();
        let list = missions(
            r#"[
                {"id": 10, "origin_system": "Home", "destination_systems": ["Far"]},
                {"id": 11, "origin_system": "Home", "destination_systems": ["Near"]}
            ]"#,
        );
        let event = resolve(&NearestResolver, &provider, &list).unwrap();
        let names: Vec<_> = event.route.waypoints.iter().map(|w| w.system_name.as_str()).collect();
        assert_eq!(names, ["Home", "Near"]);
        assert!(event.route.waypoints[0].visited);
        assert_eq!(event.mission_ids, vec![11]);
        assert_eq!(event.count, 1);
    }

    #[test]
    fn nearest_tie_keeps_first_seen() {
        let provider = provider();
        let list = missions(
            r#"[
                {"id": 1, "origin_system": "Home", "destination_systems": ["AlsoNear"]},
                {"id": 2, "origin_system": "Home", "destination_systems": ["Near"]}
            ]"#,
        );
        let event = resolve(&NearestResolver, &provider, &list).unwrap();
        assert_eq!(event.system.as_deref(), Some("AlsoNear"));
    }

    #[test]
    fn farthest_picks_most_distant() {
        let provider = provider();
        let list = missions(
            r#"[
                {"id": 10, "origin_system": "Home", "destination_systems": ["Near"]},
                {"id": 11, "origin_system": "Home", "destination_systems": ["Far"]},
                {"id": 12, "origin_system": "Home", "destination_systems": ["Far"]}
            ]"#,
        );
        let event = resolve(&FarthestResolver, &provider, &list).unwrap();
        assert_eq!(event.system.as_deref(), Some("Far"));
        assert_eq!(event.mission_ids, vec![11, 12]);
    }

    #[test]
    fn inactive_missions_are_ignored() {
        let provider = provider();
        let list = missions(
            r#"[{"id": 10, "status": "failed", "origin_system": "Home", "destination_systems": ["Near"]}]"#,
        );
        assert!(resolve(&NearestResolver, &provider, &list).is_none());
        assert!(resolve(&FarthestResolver, &provider, &list).is_none());
        assert!(resolve(&MostResolver, &provider, &list).is_none());
    }

    #[test]
    fn most_prefers_count_then_distance() {
        let provider = provider();
        let list = missions(
            r#"[
                {"id": 1, "origin_system": "Home", "destination_systems": ["Far"]},
                {"id": 2, "origin_system": "Home", "destination_systems": ["Far"]},
                {"id": 3, "origin_system": "Home", "destination_systems": ["Near"]},
                {"id": 4, "origin_system": "Home", "destination_systems": ["AlsoNear"]},
                {"id": 5, "origin_system": "Home", "destination_systems": ["AlsoNear"]}
            ]"#,
        );
        let event = resolve(&MostResolver, &provider, &list).unwrap();
        assert_eq!(event.system.as_deref(), Some("AlsoNear"));
        assert_eq!(event.mission_ids, vec![4, 5]);
        assert_eq!(event.count, 2);
    }

    #[test]
    fn expiring_orders_by_expiry() {
        let provider = provider();
        let list = missions(
            r#"[
                {"id": 1, "origin_system": "Home", "destination_systems": ["Near"], "expiry": "2026-11-02T00:00:00Z"},
                {"id": 2, "origin_system": "Home", "destination_systems": ["Far"], "expiry": "2026-10-20T12:00:00Z"},
                {"id": 3, "origin_system": "Home", "destination_systems": ["AlsoNear"]}
            ]"#,
        );
        let event = resolve(&ExpiringResolver, &provider, &list).unwrap();
        assert_eq!(event.system.as_deref(), Some("Far"));
        assert_eq!(event.mission_ids, vec![2]);
    }

    #[test]
    fn expiring_without_expiries_has_no_result() {
        let provider = provider();
        let list = missions(
            r#"[{"id": 3, "origin_system": "Home", "destination_systems": ["AlsoNear"]}]"#,
        );
        assert!(resolve(&ExpiringResolver, &provider, &list).is_none());
    }

    #[test]
    fn source_targets_return_origin() {
        let provider = provider();
        let list = missions(
            r#"[
                {"id": 1, "origin_system": "Far", "return_to_origin": true, "destination_systems": ["Home"]},
                {"id": 2, "origin_system": "Near", "destination_systems": ["Far"]}
            ]"#,
        );
        let event = resolve(&SourceResolver, &provider, &list).unwrap();
        assert_eq!(event.system.as_deref(), Some("Far"));
        assert_eq!(event.mission_ids, vec![1]);
    }

    #[test]
    fn unknown_destination_is_no_result() {
        let provider = provider();
        let list = missions(
            r#"[{"id": 1, "origin_system": "Home", "destination_systems": ["Nowhere"]}]"#,
        );
        assert!(resolve(&NearestResolver, &provider, &list).is_none());
    }

    #[test]
    fn destination_at_start_yields_single_stop() {
        let provider = provider();
        let list = missions(
            r#"[{"id": 1, "origin_system": "Near", "destination_systems": ["Home"]}]"#,
        );
        let event = resolve(&NearestResolver, &provider, &list).unwrap();
        assert_eq!(event.route.len(), 1);
        assert_eq!(event.system.as_deref(), Some("Home"));
    }
}
