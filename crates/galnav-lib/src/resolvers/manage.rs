//! Route management: cancelling the plotted route and recording progress
//! along it.

use tracing::debug;

use crate::error::Result;
use crate::event::RouteDetailsEvent;
use crate::query::{Query, QueryType};
use crate::route::RouteCollection;
use crate::waypoint::Waypoint;

use super::{QueryResolver, ResolveContext};

/// Clears the plotted route.
///
/// Always answers with an empty route; the service drops the stored plot
/// when it sees this event.
#[derive(Debug, Clone, Default)]
pub struct CancelResolver;

impl QueryResolver for CancelResolver {
    fn query_type(&self) -> QueryType {
        QueryType::Cancel
    }

    fn resolve(
        &self,
        _query: &Query,
        _start: &Waypoint,
        _ctx: &ResolveContext<'_>,
    ) -> Result<Option<RouteDetailsEvent>> {
        Ok(Some(RouteDetailsEvent::for_route(
            QueryType::Cancel,
            RouteCollection::new(),
            0,
        )))
    }
}

/// Marks the plotted route visited up to the current system.
///
/// `count` is the number of stops still ahead.
#[derive(Debug, Clone, Default)]
pub struct UpdateResolver;

impl QueryResolver for UpdateResolver {
    fn query_type(&self) -> QueryType {
        QueryType::Update
    }

    fn resolve(
        &self,
        _query: &Query,
        start: &Waypoint,
        ctx: &ResolveContext<'_>,
    ) -> Result<Option<RouteDetailsEvent>> {
        let Some(plotted) = ctx.config.plotted_route.as_ref() else {
            debug!("no plotted route to update");
            return Ok(None);
        };
        let Some(address) = start.system_address else {
            debug!(system = %start.system_name, "current system has no address");
            return Ok(None);
        };
        let Some(updated) = plotted.mark_visited_through(address) else {
            debug!(system = %start.system_name, "current system is not on the plotted route");
            return Ok(None);
        };

        let remaining = updated.waypoints.iter().filter(|wp| !wp.visited).count() as u64;
        Ok(Some(RouteDetailsEvent::for_route(QueryType::Update, updated, remaining)))
    }
}
