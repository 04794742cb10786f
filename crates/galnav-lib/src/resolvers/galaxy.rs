//! Galaxy queries: fuel scoop stars, neutron highway plots and direct plots.

use tracing::{debug, warn};

use crate::error::Result;
use crate::event::RouteDetailsEvent;
use crate::provider::{PlotRequest, SearchFilter};
use crate::query::{Query, QueryType};
use crate::waypoint::Waypoint;

use super::{plotted_route, single_destination_route, QueryResolver, ResolveContext};

/// Nearest star that can be fuel-scooped.
///
/// The search radius is the numeric argument, or the current ship's jump
/// range when none is given.
#[derive(Debug, Clone, Default)]
pub struct ScoopResolver;

impl QueryResolver for ScoopResolver {
    fn query_type(&self) -> QueryType {
        QueryType::Scoop
    }

    fn resolve(
        &self,
        query: &Query,
        start: &Waypoint,
        ctx: &ResolveContext<'_>,
    ) -> Result<Option<RouteDetailsEvent>> {
        let radius = query
            .numeric
            .or_else(|| ctx.traveller.current_ship().map(|ship| ship.jump_range_ly));
        let filter = SearchFilter::scoopable(radius);

        let Some(found) = ctx.provider.nearest_match(start, &filter) else {
            debug!(radius = ?radius, "no scoopable star in range");
            return Ok(None);
        };

        let route = single_destination_route(start, found.waypoint);
        let jumps = route.jump_count() as u64;
        Ok(Some(RouteDetailsEvent::for_route(QueryType::Scoop, route, jumps)))
    }
}

/// Neutron highway route to the system named by the first argument.
#[derive(Debug, Clone, Default)]
pub struct NeutronResolver;

impl QueryResolver for NeutronResolver {
    fn query_type(&self) -> QueryType {
        QueryType::Neutron
    }

    fn resolve(
        &self,
        query: &Query,
        start: &Waypoint,
        ctx: &ResolveContext<'_>,
    ) -> Result<Option<RouteDetailsEvent>> {
        let Some(destination) = query.arg0() else {
            warn!("neutron route requested without a destination");
            return Ok(None);
        };
        let Some(jump_range_ly) = query
            .numeric
            .or_else(|| ctx.traveller.current_ship().map(|ship| ship.jump_range_ly))
        else {
            warn!("neutron route requires a jump range but no ship is known");
            return Ok(None);
        };

        let request = PlotRequest::Neutron {
            from: start.clone(),
            to: destination.to_string(),
            jump_range_ly,
        };
        let Some(plot) = ctx.provider.plot_route(&request) else {
            debug!(destination, "no neutron route found");
            return Ok(None);
        };

        let route = plotted_route(start, plot);
        let jumps = route.jump_count() as u64;
        Ok(Some(RouteDetailsEvent::for_route(QueryType::Neutron, route, jumps)))
    }
}

/// Direct plot to a named system, optionally a station within it.
#[derive(Debug, Clone, Default)]
pub struct SetResolver;

impl QueryResolver for SetResolver {
    fn query_type(&self) -> QueryType {
        QueryType::Set
    }

    fn resolve(
        &self,
        query: &Query,
        start: &Waypoint,
        ctx: &ResolveContext<'_>,
    ) -> Result<Option<RouteDetailsEvent>> {
        let Some(system) = query.arg0() else {
            warn!("set route requested without a system");
            return Ok(None);
        };
        let Some(mut destination) = ctx.provider.system_by_name(system) else {
            warn!(system, "cannot set route to unknown system");
            return Ok(None);
        };

        if let Some(station_name) = query.arg1() {
            destination = match ctx.provider.station_by_name(system, station_name) {
                Some(station) => destination.with_station(station.name, station.market_id),
                None => {
                    debug!(system, station = station_name, "station unknown; keeping name only");
                    destination.with_station(station_name, None)
                }
            };
        }

        let route = single_destination_route(start, destination);
        let jumps = route.jump_count() as u64;
        Ok(Some(RouteDetailsEvent::for_route(QueryType::Set, route, jumps)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NavigationConfig;
    use crate::provider::{LandingPadSize, Station};
    use crate::resolvers::test_support::{context, traveller, FakeProvider};

    fn provider() -> FakeProvider {
        FakeProvider::default()
            .with_system("Home", 1, [0.0, 0.0, 0.0])
            .with_scoopable("Warm", 2, [8.0, 0.0, 0.0])
            .with_scoopable("Hot", 3, [40.0, 0.0, 0.0])
            .with_system("Goal", 4, [100.0, 0.0, 0.0])
    }

    fn run(resolver: &dyn QueryResolver, provider: &FakeProvider, query: Query) -> Option<RouteDetailsEvent> {
        let start = provider.system("Home");
        let state = traveller(start.clone());
        let config = NavigationConfig::default();
        let ctx = context(provider, &state, &[], &config);
        resolver.resolve(&query, &start, &ctx).expect("no fault")
    }

    #[test]
    fn scoop_uses_ship_range() {
        let provider = provider();
        let event = run(&ScoopResolver, &provider, Query::new(QueryType::Scoop)).unwrap();
        assert_eq!(event.system.as_deref(), Some("Warm"));
        assert_eq!(event.count, 1);
    }

    #[test]
    fn scoop_radius_override_can_exclude_everything() {
        let provider = provider();
        let query = Query::new(QueryType::Scoop).with_numeric(5.0);
        assert!(run(&ScoopResolver, &provider, query).is_none());
    }

    #[test]
    fn neutron_requires_destination() {
        let provider = provider();
        assert!(run(&NeutronResolver, &provider, Query::new(QueryType::Neutron)).is_none());
    }

    #[test]
    fn neutron_builds_route_from_plot() {
        let mut provider = provider();
        let plot = vec![provider.system("Home"), provider.system("Hot"), provider.system("Goal")];
        provider.plots.insert("Goal".to_string(), plot);

        let event = run(
            &NeutronResolver,
            &provider,
            Query::new(QueryType::Neutron).with_arg0("Goal"),
        )
        .unwrap();
        assert_eq!(event.route.len(), 3);
        assert_eq!(event.count, 2);
        assert_eq!(event.system.as_deref(), Some("Hot"));
        assert!((event.route.total_distance() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn set_resolves_station_market() {
        let mut provider = provider();
        provider.stations.push(Station {
            name: "Goal Port".to_string(),
            market_id: Some(77),
            system_name: "Goal".to_string(),
            system_address: Some(4),
            distance_from_arrival_ls: 120.0,
            max_pad: LandingPadSize::Large,
            planetary: false,
            services: Vec::new(),
        });

        let query = Query::new(QueryType::Set).with_arg0("goal").with_arg1("Goal Port");
        let event = run(&SetResolver, &provider, query).unwrap();
        assert_eq!(event.system.as_deref(), Some("Goal"));
        assert_eq!(event.station.as_deref(), Some("Goal Port"));
        assert_eq!(event.market_id, Some(77));
    }

    #[test]
    fn set_unknown_system_is_no_result() {
        let provider = provider();
        let query = Query::new(QueryType::Set).with_arg0("Nowhere");
        assert!(run(&SetResolver, &provider, query).is_none());
    }
}
