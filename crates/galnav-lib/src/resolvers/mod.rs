//! Query resolvers implementing the Strategy pattern.
//!
//! Each query type is answered by one [`QueryResolver`]. The
//! [`ResolverRegistry`](crate::registry::ResolverRegistry) maps query types to
//! resolvers, so new queries can be added without touching the
//! [`NavigationService`](crate::service::NavigationService) orchestration.
//!
//! - [`missions`] - nearest / farthest / most / expiring / source mission systems
//! - [`rnna`] - multi-stop mission circuit (repetitive nearest neighbour)
//! - [`galaxy`] - fuel scoop stars, neutron highway plots, direct plots
//! - [`carrier`] - fleet carrier jump routes
//! - [`services`] - nearest station offering a service
//! - [`manage`] - cancelling and progressing the plotted route

pub mod carrier;
pub mod galaxy;
pub mod manage;
pub mod missions;
pub mod rnna;
pub mod services;

use crate::config::NavigationConfig;
use crate::error::Result;
use crate::event::RouteDetailsEvent;
use crate::mission::Mission;
use crate::provider::{StarSystemProvider, TravellerState};
use crate::query::{Query, QueryType};
use crate::route::RouteCollection;
use crate::waypoint::Waypoint;

pub use carrier::CarrierResolver;
pub use galaxy::{NeutronResolver, ScoopResolver, SetResolver};
pub use manage::{CancelResolver, UpdateResolver};
pub use missions::{
    ExpiringResolver, FarthestResolver, MostResolver, NearestResolver, SourceResolver,
};
pub use rnna::MissionRouteResolver;
pub use services::ServiceResolver;

/// Read-only collaborators available to a resolver.
pub struct ResolveContext<'a> {
    pub provider: &'a dyn StarSystemProvider,
    pub traveller: &'a dyn TravellerState,
    pub missions: &'a [Mission],
    pub config: &'a NavigationConfig,
}

/// Trait for query resolution strategies.
pub trait QueryResolver: Send + Sync {
    /// The query type this resolver answers.
    fn query_type(&self) -> QueryType;

    /// Compute a route for `query` starting at `start`.
    ///
    /// Returns `Ok(None)` when there is nothing to answer (no eligible
    /// candidate, unknown destination). `Err` is reserved for faults.
    fn resolve(
        &self,
        query: &Query,
        start: &Waypoint,
        ctx: &ResolveContext<'_>,
    ) -> Result<Option<RouteDetailsEvent>>;
}

/// Every built-in resolver, one per query type.
pub fn default_resolvers() -> Vec<Box<dyn QueryResolver>> {
    let mut resolvers: Vec<Box<dyn QueryResolver>> = vec![
        Box::new(ScoopResolver),
        Box::new(NeutronResolver),
        Box::new(SetResolver),
        Box::new(ExpiringResolver),
        Box::new(FarthestResolver),
        Box::new(MostResolver),
        Box::new(NearestResolver),
        Box::new(MissionRouteResolver),
        Box::new(SourceResolver),
        Box::new(CarrierResolver),
        Box::new(CancelResolver),
        Box::new(UpdateResolver),
    ];
    resolvers.extend(
        QueryType::ALL
            .into_iter()
            .filter_map(ServiceResolver::for_query)
            .map(|r| Box::new(r) as Box<dyn QueryResolver>),
    );
    resolvers
}

/// Route made of the start system and, if it is a different system, the
/// destination.
pub(crate) fn single_destination_route(start: &Waypoint, destination: Waypoint) -> RouteCollection {
    let mut route = RouteCollection::from_origin(start.position());
    route.push(start.clone().into_visited());
    if !start.is_same_system(&destination) {
        route.push(destination);
    }
    route.finalize()
}

/// Route from a provider plot. The start system leads the route and is
/// marked visited whether or not the plot included it.
pub(crate) fn plotted_route(start: &Waypoint, plot: Vec<Waypoint>) -> RouteCollection {
    let mut route = RouteCollection::from_origin(start.position());
    route.push(start.clone().into_visited());
    route
        .waypoints
        .extend(plot.into_iter().skip_while(|wp| wp.is_same_system(start)));
    route.dedup_by_address();
    route.finalize()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SystemPosition;
    use std::collections::HashSet;

    #[test]
    fn default_resolvers_cover_every_query_type_once() {
        let resolvers = default_resolvers();
        let types: HashSet<_> = resolvers.iter().map(|r| r.query_type()).collect();
        assert_eq!(types.len(), resolvers.len());
        assert_eq!(types.len(), QueryType::ALL.len());
    }

    #[test]
    fn single_destination_omits_same_system() {
        let start = Waypoint::at("Sol", 1, SystemPosition::new(0.0, 0.0, 0.0));
        let route = single_destination_route(&start, start.clone());
        assert_eq!(route.len(), 1);
        assert!(route.waypoints[0].visited);
    }

    #[test]
    fn plotted_route_leads_with_visited_start() {
        let start = Waypoint::at("Sol", 1, SystemPosition::new(0.0, 0.0, 0.0));
        let plot = vec![
            start.clone(),
            Waypoint::at("Hop", 2, SystemPosition::new(10.0, 0.0, 0.0)),
            Waypoint::at("Goal", 3, SystemPosition::new(20.0, 0.0, 0.0)),
        ];
        let route = plotted_route(&start, plot);
        assert_eq!(route.len(), 3);
        assert!(route.waypoints[0].visited);
        assert!(!route.waypoints[1].visited);
        assert_eq!(route.final_destination().unwrap().distance_travelled, Some(20.0));
    }
}
