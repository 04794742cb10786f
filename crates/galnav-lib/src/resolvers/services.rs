//! Nearest station offering a service (material traders, brokers, black
//! markets).

use tracing::debug;

use crate::error::{Error, Result};
use crate::event::RouteDetailsEvent;
use crate::provider::SearchFilter;
use crate::query::{Query, QueryType};
use crate::waypoint::Waypoint;

use super::{single_destination_route, QueryResolver, ResolveContext};

/// Nearest station offering the service named by the query type.
///
/// The numeric argument overrides the maximum station distance from the
/// arrival star and the boolean argument overrides the orbital preference;
/// otherwise both come from the navigation configuration. The pad size is
/// taken from the current ship.
#[derive(Debug, Clone)]
pub struct ServiceResolver {
    query_type: QueryType,
}

impl ServiceResolver {
    /// Resolver for a service query type, `None` for any other query.
    pub fn for_query(query_type: QueryType) -> Option<Self> {
        query_type.station_service()?;
        Some(Self { query_type })
    }

    fn filter(&self, query: &Query, ctx: &ResolveContext<'_>) -> Result<SearchFilter> {
        let service = self
            .query_type
            .station_service()
            .ok_or_else(|| Error::Resolver {
                query: self.query_type,
                message: "query type does not name a station service".to_string(),
            })?;
        let max_distance = query
            .numeric
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(ctx.config.max_station_distance_ls);
        let prefer_orbital = query
            .flag
            .unwrap_or(ctx.config.prioritize_orbital_stations);
        let pad = ctx.traveller.current_ship().map(|ship| ship.landing_pad);

        Ok(SearchFilter::facility(service, max_distance)
            .with_landing_pad(pad)
            .with_prefer_orbital(prefer_orbital))
    }
}

impl QueryResolver for ServiceResolver {
    fn query_type(&self) -> QueryType {
        self.query_type
    }

    fn resolve(
        &self,
        query: &Query,
        start: &Waypoint,
        ctx: &ResolveContext<'_>,
    ) -> Result<Option<RouteDetailsEvent>> {
        let filter = self.filter(query, ctx)?;
        let Some(found) = ctx.provider.nearest_match(start, &filter) else {
            debug!(query = %self.query_type, ?filter, "no matching station");
            return Ok(None);
        };

        let arrival_ls = found
            .distance_from_arrival_ls
            .map(|d| d.max(0.0).round() as u64)
            .unwrap_or_default();
        let route = single_destination_route(start, found.waypoint.clone());

        // A station in the current system leaves a one-stop route; the event
        // must still name the station.
        let mut event = RouteDetailsEvent::for_route(self.query_type, route, arrival_ls);
        event.station = found.waypoint.station_name;
        event.market_id = found.waypoint.market_id;
        Ok(Some(event))
    }
}
