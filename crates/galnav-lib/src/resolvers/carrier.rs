use tracing::{debug, warn};

use crate::error::Result;
use crate::event::RouteDetailsEvent;
use crate::provider::PlotRequest;
use crate::query::{Query, QueryType};
use crate::waypoint::Waypoint;

use super::{plotted_route, QueryResolver, ResolveContext};

/// Fleet carrier jump route.
///
/// `start` is the carrier's system, not the commander's. The destination is
/// the first argument, falling back to the last carrier destination; used
/// capacity comes from the numeric argument or the carrier itself.
#[derive(Debug, Clone, Default)]
pub struct CarrierResolver;

impl QueryResolver for CarrierResolver {
    fn query_type(&self) -> QueryType {
        QueryType::Carrier
    }

    fn resolve(
        &self,
        query: &Query,
        start: &Waypoint,
        ctx: &ResolveContext<'_>,
    ) -> Result<Option<RouteDetailsEvent>> {
        let Some(destination) = query
            .arg0()
            .or(ctx.config.last_carrier_destination.as_deref())
        else {
            warn!("carrier route requested without a destination");
            return Ok(None);
        };

        let used_capacity = match query.numeric {
            Some(value) if value.is_finite() && value >= 0.0 => value.round() as u32,
            _ => ctx
                .traveller
                .fleet_carrier()
                .map(|carrier| carrier.used_capacity)
                .unwrap_or_default(),
        };

        let request = PlotRequest::Carrier {
            from: start.clone(),
            to: destination.to_string(),
            used_capacity,
        };
        let Some(plot) = ctx.provider.plot_route(&request) else {
            debug!(destination, "no carrier route found");
            return Ok(None);
        };

        let route = plotted_route(start, plot);
        let jumps = route.jump_count() as u64;
        Ok(Some(RouteDetailsEvent::for_route(QueryType::Carrier, route, jumps)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NavigationConfig;
    use crate::resolvers::test_support::{context, traveller, FakeProvider};

    fn provider() -> FakeProvider {
        let mut provider = FakeProvider::default()
            .with_system("Dock", 1, [0.0, 0.0, 0.0])
            .with_system("Midway", 2, [450.0, 0.0, 0.0])
            .with_system("Colony", 3, [900.0, 0.0, 0.0]);
        let plot = vec![provider.system("Dock"), provider.system("Midway"), provider.system("Colony")];
        provider.plots.insert("Colony".to_string(), plot);
        provider
    }

    #[test]
    fn plots_to_named_destination() {
        let provider = provider();
        let start = provider.system("Dock");
        let state = traveller(start.clone());
        let config = NavigationConfig::default();
        let ctx = context(&provider, &state, &[], &config);

        let query = Query::new(QueryType::Carrier).with_arg0("Colony");
        let event = CarrierResolver.resolve(&query, &start, &ctx).unwrap().unwrap();
        assert_eq!(event.count, 2);
        assert_eq!(event.route.final_destination().unwrap().system_name, "Colony");
    }

    #[test]
    fn falls_back_to_last_carrier_destination() {
        let provider = provider();
        let start = provider.system("Dock");
        let state = traveller(start.clone());
        let config = NavigationConfig {
            last_carrier_destination: Some("Colony".to_string()),
            ..NavigationConfig::default()
        };
        let ctx = context(&provider, &state, &[], &config);

        let event = CarrierResolver
            .resolve(&Query::new(QueryType::Carrier), &start, &ctx)
            .unwrap();
        assert!(event.is_some());
    }

    #[test]
    fn no_destination_is_no_result() {
        let provider = provider();
        let start = provider.system("Dock");
        let state = traveller(start.clone());
        let config = NavigationConfig::default();
        let ctx = context(&provider, &state, &[], &config);

        let event = CarrierResolver
            .resolve(&Query::new(QueryType::Carrier), &start, &ctx)
            .unwrap();
        assert!(event.is_none());
    }
}
