//! Navigation facade.
//!
//! [`NavigationService`] is the single entry point for answering queries. It
//! picks the starting system, dispatches to the registered resolver, applies
//! the route continuity check, and then records the outcome: last-query
//! memory, the plotted routes, and the search system/station convenience
//! fields. Resolution is serialized, and observers only ever see a state
//! where all of those were updated together.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::{self, ThreadId};

use tracing::{debug, error, info, warn};

use crate::config::{ConfigStore, NavigationConfig};
use crate::continuity::should_replace;
use crate::error::{Error, Result};
use crate::event::RouteDetailsEvent;
use crate::provider::{MissionSource, StarSystemProvider, Station, TravellerState};
use crate::query::{Query, QueryType};
use crate::registry::ResolverRegistry;
use crate::resolvers::ResolveContext;
use crate::waypoint::Waypoint;

/// Published navigation state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationSnapshot {
    pub config: NavigationConfig,
    /// System targeted by the last result, re-resolved through the provider.
    pub search_system: Option<Waypoint>,
    /// Station targeted by the last result, if any.
    pub search_station: Option<Station>,
    /// True while a resolution is in progress.
    pub is_working: bool,
}

/// Receives the navigation state after every change.
///
/// Notifications are delivered on the resolving thread while that resolution
/// still holds the service, so snapshots from concurrent callers never
/// interleave. Reading state back through [`NavigationService::snapshot`] is
/// fine from inside the callback; a nested [`NavigationService::resolve`] is
/// refused with `None`.
pub trait NavigationObserver: Send + Sync {
    fn state_changed(&self, snapshot: &NavigationSnapshot);
}

/// Query resolution facade.
pub struct NavigationService {
    registry: ResolverRegistry,
    provider: Arc<dyn StarSystemProvider>,
    traveller: Arc<dyn TravellerState>,
    missions: Arc<dyn MissionSource>,
    store: Arc<dyn ConfigStore>,
    resolve_lock: Mutex<()>,
    resolving_on: Mutex<Option<ThreadId>>,
    state: RwLock<NavigationSnapshot>,
    observers: RwLock<Vec<Arc<dyn NavigationObserver>>>,
}

impl NavigationService {
    /// Service with every built-in resolver.
    ///
    /// Fails only if the stored configuration cannot be loaded.
    pub fn new(
        provider: Arc<dyn StarSystemProvider>,
        traveller: Arc<dyn TravellerState>,
        missions: Arc<dyn MissionSource>,
        store: Arc<dyn ConfigStore>,
    ) -> Result<Self> {
        Self::with_registry(
            ResolverRegistry::with_defaults(),
            provider,
            traveller,
            missions,
            store,
        )
    }

    pub fn with_registry(
        registry: ResolverRegistry,
        provider: Arc<dyn StarSystemProvider>,
        traveller: Arc<dyn TravellerState>,
        missions: Arc<dyn MissionSource>,
        store: Arc<dyn ConfigStore>,
    ) -> Result<Self> {
        let config = store.load()?;
        debug!(resolvers = registry.len(), last_query = ?config.last_query, "navigation service ready");
        Ok(Self {
            registry,
            provider,
            traveller,
            missions,
            store,
            resolve_lock: Mutex::new(()),
            resolving_on: Mutex::new(None),
            state: RwLock::new(NavigationSnapshot {
                config,
                ..NavigationSnapshot::default()
            }),
            observers: RwLock::new(Vec::new()),
        })
    }

    pub fn registry(&self) -> &ResolverRegistry {
        &self.registry
    }

    pub fn subscribe(&self, observer: Arc<dyn NavigationObserver>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    pub fn snapshot(&self) -> NavigationSnapshot {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_working(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_working
    }

    pub fn config(&self) -> NavigationConfig {
        self.snapshot().config
    }

    /// Positional form of [`resolve`](Self::resolve).
    pub fn resolve_with(
        &self,
        query_type: QueryType,
        arg0: Option<&str>,
        arg1: Option<&str>,
        numeric: Option<f64>,
        flag: Option<bool>,
        from_ui: bool,
    ) -> Option<RouteDetailsEvent> {
        self.resolve(Query {
            query_type,
            arg0: arg0.map(str::to_string),
            arg1: arg1.map(str::to_string),
            numeric,
            flag,
            from_ui,
        })
    }

    /// Answer a query.
    ///
    /// `None` is the only failure signal; the reason is logged.
    pub fn resolve(&self, query: Query) -> Option<RouteDetailsEvent> {
        let this_thread = thread::current().id();
        if *self.resolving_on.lock().unwrap_or_else(PoisonError::into_inner) == Some(this_thread) {
            warn!(query = %query.query_type, "nested resolve from an observer ignored");
            return None;
        }
        let _serial = self
            .resolve_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *self.resolving_on.lock().unwrap_or_else(PoisonError::into_inner) = Some(this_thread);
        let _working = WorkingGuard::start(self);

        let config = self.config();
        let event = self.compute(&query, &config)?;
        self.publish(&query, &event, config);
        info!(
            query = %query.query_type,
            system = event.system.as_deref().unwrap_or_default(),
            count = event.count,
            from_ui = query.from_ui,
            "query resolved"
        );
        Some(event)
    }

    /// Run the resolver for `query` without touching published state.
    fn compute(&self, query: &Query, config: &NavigationConfig) -> Option<RouteDetailsEvent> {
        let query_type = query.query_type;
        let start = self.starting_system(query_type)?;

        let Some(resolver) = self.registry.get(query_type) else {
            let err = Error::ResolverMissing { query: query_type };
            error!(error = %err, "configuration error");
            return None;
        };

        let missions = self.missions.missions();
        let ctx = ResolveContext {
            provider: self.provider.as_ref(),
            traveller: self.traveller.as_ref(),
            missions: &missions,
            config,
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| resolver.resolve(query, &start, &ctx)));
        let event = match outcome {
            Ok(Ok(Some(event))) => event,
            Ok(Ok(None)) => {
                debug!(query = %query_type, start = %start.system_name, "no result");
                return None;
            }
            Ok(Err(err)) => {
                error!(query = %query_type, arg0 = ?query.arg0, arg1 = ?query.arg1, error = %err, "resolver failed");
                return None;
            }
            Err(payload) => {
                error!(
                    query = %query_type,
                    arg0 = ?query.arg0,
                    arg1 = ?query.arg1,
                    panic = panic_message(payload.as_ref()),
                    "resolver panicked"
                );
                return None;
            }
        };

        if query_type.is_continuity_checked() {
            let stored = match query_type {
                QueryType::Carrier => config.carrier_route.as_ref(),
                _ => config
                    .plotted_route
                    .as_ref()
                    .filter(|_| config.plotted_query.is_some_and(|q| query_type.is_continuous_with(q))),
            };
            if let Some(stored) = stored.filter(|stored| !should_replace(Some(stored), &event.route)) {
                return Some(event.with_route(stored.clone()));
            }
        }
        Some(event)
    }

    /// The carrier's system for carrier queries, otherwise the traveller's.
    fn starting_system(&self, query_type: QueryType) -> Option<Waypoint> {
        if query_type != QueryType::Carrier {
            let start = self.traveller.current_system();
            if start.is_none() {
                warn!(query = %query_type, "current system unknown; cannot resolve yet");
            }
            return start;
        }

        let Some(carrier) = self.traveller.fleet_carrier() else {
            warn!("no fleet carrier known");
            return None;
        };
        let Some(system) = carrier.current_system.as_deref() else {
            warn!(carrier = %carrier.name, "fleet carrier location unknown");
            return None;
        };
        let start = self.provider.system_by_name(system);
        if start.is_none() {
            warn!(carrier = %carrier.name, system, "fleet carrier system not found");
        }
        start
    }

    /// Record a successful result and publish it with `is_working` cleared.
    fn publish(&self, query: &Query, event: &RouteDetailsEvent, mut config: NavigationConfig) {
        let query_type = query.query_type;
        if query_type.group().is_some() {
            config.last_query = Some(query_type);
            config.last_arg0 = query.arg0().map(str::to_string);
            config.last_arg1 = query.arg1().map(str::to_string);
        }
        match query_type {
            QueryType::Carrier => {
                if let Some(destination) = query.arg0() {
                    config.last_carrier_destination = Some(destination.to_string());
                }
                config.carrier_route = Some(event.route.clone());
            }
            QueryType::Cancel => {
                config.plotted_route = None;
                config.plotted_query = None;
            }
            QueryType::Update => config.plotted_route = Some(event.route.clone()),
            _ => {
                config.plotted_route = Some(event.route.clone());
                config.plotted_query = Some(query_type);
            }
        }

        if let Err(err) = self.store.save(&config) {
            error!(error = %err, "failed to save navigation config");
        }

        let search_system = event
            .system_address
            .filter(|&address| address != 0)
            .and_then(|address| self.provider.system_by_address(address));
        let search_station = search_system
            .as_ref()
            .and(event.market_id)
            .filter(|&market_id| market_id != 0)
            .and_then(|market_id| self.provider.station_by_market_id(market_id));

        let snapshot = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.config = config;
            state.search_system = search_system;
            state.search_station = search_station;
            state.is_working = false;
            state.clone()
        };
        self.notify(&snapshot);
    }

    fn set_working(&self, working: bool) {
        let snapshot = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if state.is_working == working {
                return;
            }
            state.is_working = working;
            state.clone()
        };
        self.notify(&snapshot);
    }

    fn notify(&self, snapshot: &NavigationSnapshot) {
        let observers = self
            .observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for observer in observers {
            observer.state_changed(snapshot);
        }
    }
}

/// Holds `is_working` up for the duration of a resolution and marks the
/// resolving thread.
struct WorkingGuard<'a> {
    service: &'a NavigationService,
}

impl<'a> WorkingGuard<'a> {
    fn start(service: &'a NavigationService) -> Self {
        service.set_working(true);
        Self { service }
    }
}

impl Drop for WorkingGuard<'_> {
    fn drop(&mut self) {
        self.service.set_working(false);
        *self
            .service
            .resolving_on
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryConfigStore;
    use crate::provider::{FleetCarrier, LandingPadSize, StationService, TravellerSnapshot};
    use crate::resolvers::test_support::{missions, traveller, FakeProvider};
    use crate::resolvers::{NearestResolver, QueryResolver};
    use crate::route::RouteCollection;

    fn provider() -> FakeProvider {
        let mut provider = FakeProvider::default()
            .with_system("Sol", 1, [0.0, 0.0, 0.0])
            .with_system("Near", 2, [5.0, 0.0, 0.0])
            .with_system("Far", 3, [12.0, 0.0, 0.0])
            .with_system("Dock", 4, [100.0, 0.0, 0.0])
            .with_system("Hop", 5, [60.0, 0.0, 0.0]);
        provider.stations.push(Station {
            name: "Near Port".to_string(),
            market_id: Some(200),
            system_name: "Near".to_string(),
            system_address: Some(2),
            distance_from_arrival_ls: 300.0,
            max_pad: LandingPadSize::Large,
            planetary: false,
            services: vec![StationService::BlackMarket],
        });
        let plot = vec![provider.system("Sol"), provider.system("Hop"), provider.system("Dock")];
        provider.plots.insert("Dock".to_string(), plot);
        let carrier_plot = vec![provider.system("Dock"), provider.system("Sol")];
        provider.plots.insert("Sol".to_string(), carrier_plot);
        provider
    }

    fn state() -> TravellerSnapshot {
        let provider = provider();
        let mut state = traveller(provider.system("Sol"));
        state.missions = missions(
            r#"[
                {"id": 11, "origin_system": "Sol", "destination_systems": ["Far"]},
                {"id": 12, "origin_system": "Sol", "destination_systems": ["Near"]}
            ]"#,
        );
        state
    }

    fn service_with(
        registry: ResolverRegistry,
        state: TravellerSnapshot,
        config: NavigationConfig,
    ) -> (NavigationService, Arc<MemoryConfigStore>) {
        let state = Arc::new(state);
        let store = Arc::new(MemoryConfigStore::new(config));
        let service = NavigationService::with_registry(
            registry,
            Arc::new(provider()),
            state.clone(),
            state,
            store.clone(),
        )
        .unwrap();
        (service, store)
    }

    fn service() -> (NavigationService, Arc<MemoryConfigStore>) {
        service_with(ResolverRegistry::with_defaults(), state(), NavigationConfig::default())
    }

    struct Recorder(Mutex<Vec<NavigationSnapshot>>);

    impl NavigationObserver for Recorder {
        fn state_changed(&self, snapshot: &NavigationSnapshot) {
            self.0.lock().unwrap().push(snapshot.clone());
        }
    }

    struct Panicking;

    impl QueryResolver for Panicking {
        fn query_type(&self) -> QueryType {
            QueryType::Most
        }

        fn resolve(&self, _: &Query, _: &Waypoint, _: &ResolveContext<'_>) -> Result<Option<RouteDetailsEvent>> {
            panic!("malformed mission record");
        }
    }

    struct Failing;

    impl QueryResolver for Failing {
        fn query_type(&self) -> QueryType {
            QueryType::Expiring
        }

        fn resolve(&self, _: &Query, _: &Waypoint, _: &ResolveContext<'_>) -> Result<Option<RouteDetailsEvent>> {
            Err(Error::Resolver {
                query: QueryType::Expiring,
                message: "bad expiry".to_string(),
            })
        }
    }

    #[test]
    fn nearest_mission_updates_memory_and_search_fields() {
        let (service, store) = service();
        let event = service.resolve(Query::new(QueryType::Nearest).from_ui()).unwrap();

        let names: Vec<_> = event.route.waypoints.iter().map(|w| w.system_name.as_str()).collect();
        assert_eq!(names, ["Sol", "Near"]);
        assert!(event.route.waypoints[0].visited);
        assert_eq!(event.mission_ids, vec![12]);

        let snapshot = service.snapshot();
        assert!(!snapshot.is_working);
        assert_eq!(snapshot.config.last_query, Some(QueryType::Nearest));
        assert_eq!(snapshot.config.plotted_route.as_ref(), Some(&event.route));
        assert_eq!(snapshot.search_system.unwrap().system_name, "Near");
        assert!(snapshot.search_station.is_none());
        assert_eq!(store.snapshot(), snapshot.config);
    }

    #[test]
    fn service_result_sets_search_station() {
        let (service, _) = service();
        let event = service
            .resolve_with(QueryType::BlackMarket, None, None, None, None, true)
            .unwrap();
        assert_eq!(event.station.as_deref(), Some("Near Port"));
        assert_eq!(service.snapshot().search_station.unwrap().market_id, Some(200));
    }

    #[test]
    fn unknown_query_type_is_no_result() {
        let registry = ResolverRegistry::from_resolvers(vec![Box::new(NearestResolver) as Box<dyn QueryResolver>]);
        let (service, store) = service_with(registry, state(), NavigationConfig::default());

        assert!(service.resolve(Query::new(QueryType::Route)).is_none());
        assert!(!service.is_working());
        assert_eq!(store.snapshot(), NavigationConfig::default());
    }

    #[test]
    fn unknown_current_system_is_no_result() {
        let mut state = state();
        state.current_system = None;
        let (service, _) = service_with(ResolverRegistry::with_defaults(), state, NavigationConfig::default());
        assert!(service.resolve(Query::new(QueryType::Nearest)).is_none());
        assert!(!service.is_working());
    }

    #[test]
    fn resolver_faults_are_swallowed() {
        let registry = ResolverRegistry::from_resolvers(vec![
            Box::new(Panicking) as Box<dyn QueryResolver>,
            Box::new(Failing),
        ]);
        let (service, store) = service_with(registry, state(), NavigationConfig::default());

        assert!(service.resolve(Query::new(QueryType::Most)).is_none());
        assert!(!service.is_working());
        assert!(service.resolve(Query::new(QueryType::Expiring)).is_none());
        assert!(!service.is_working());
        assert_eq!(store.snapshot().last_query, None);
    }

    #[test]
    fn carrier_starts_from_carrier_system() {
        let mut state = state();
        state.carrier = Some(FleetCarrier {
            name: "Jenner".to_string(),
            current_system: Some("Dock".to_string()),
            used_capacity: 1200,
        });
        let (service, _) = service_with(ResolverRegistry::with_defaults(), state, NavigationConfig::default());

        let event = service
            .resolve(Query::new(QueryType::Carrier).with_arg0("Sol"))
            .unwrap();
        assert_eq!(event.route.first().unwrap().system_name, "Dock");

        let config = service.config();
        assert_eq!(config.last_carrier_destination.as_deref(), Some("Sol"));
        assert_eq!(config.carrier_route.as_ref(), Some(&event.route));
        assert!(config.plotted_route.is_none());
    }

    #[test]
    fn carrier_without_location_is_no_result() {
        let (service, _) = service();
        assert!(service
            .resolve(Query::new(QueryType::Carrier).with_arg0("Sol"))
            .is_none());
    }

    #[test]
    fn same_destination_keeps_shorter_stored_route() {
        let provider = provider();
        let stored = RouteCollection::from_waypoints(vec![
            provider.system("Sol").into_visited(),
            provider.system("Dock"),
        ]);
        let config = NavigationConfig {
            plotted_route: Some(stored.clone()),
            plotted_query: Some(QueryType::Set),
            ..NavigationConfig::default()
        };
        let (service, _) = service_with(ResolverRegistry::with_defaults(), state(), config);

        let event = service
            .resolve(Query::new(QueryType::Neutron).with_arg0("Dock"))
            .unwrap();
        assert_eq!(event.route, stored);
        assert_eq!(event.system.as_deref(), Some("Dock"));
        assert_eq!(event.count, 1);
        assert_eq!(service.config().plotted_route, Some(stored));
        assert_eq!(service.config().last_query, Some(QueryType::Neutron));
    }

    #[test]
    fn circuit_is_not_replaced_by_a_galaxy_route() {
        let (service, _) = service();
        let set = service.resolve(Query::new(QueryType::Set).with_arg0("Dock")).unwrap();
        assert_eq!(set.route.len(), 2);
        assert_eq!(service.config().plotted_query, Some(QueryType::Set));

        let event = service
            .resolve(Query::new(QueryType::Route).with_arg0("Dock"))
            .unwrap();
        assert_eq!(event.route.len(), 4);
        assert_eq!(event.count, 4);
        assert_eq!(event.route.final_destination().unwrap().system_name, "Dock");
        assert!(event.tour_distance.is_some());
        assert_eq!(service.config().plotted_query, Some(QueryType::Route));
    }

    #[test]
    fn stored_route_without_its_query_is_not_reused() {
        let provider = provider();
        let stored = RouteCollection::from_waypoints(vec![
            provider.system("Sol").into_visited(),
            provider.system("Dock"),
        ]);
        let config = NavigationConfig {
            plotted_route: Some(stored),
            ..NavigationConfig::default()
        };
        let (service, _) = service_with(ResolverRegistry::with_defaults(), state(), config);

        let event = service
            .resolve(Query::new(QueryType::Neutron).with_arg0("Dock"))
            .unwrap();
        assert_eq!(event.route.len(), 3);
        assert_eq!(event.count, 2);
    }

    #[test]
    fn cancel_clears_route_but_not_last_query() {
        let (service, _) = service();
        service.resolve(Query::new(QueryType::Nearest)).unwrap();
        let event = service.resolve(Query::new(QueryType::Cancel)).unwrap();
        assert!(event.route.is_empty());

        let snapshot = service.snapshot();
        assert_eq!(snapshot.config.last_query, Some(QueryType::Nearest));
        assert!(snapshot.config.plotted_route.is_none());
        assert!(snapshot.config.plotted_query.is_none());
        assert!(snapshot.search_system.is_none());
    }

    #[test]
    fn observers_see_consistent_state() {
        let (service, _) = service();
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        service.subscribe(recorder.clone());

        service.resolve(Query::new(QueryType::Nearest));

        let seen = recorder.0.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].is_working);
        assert_eq!(seen[0].config.last_query, None);
        assert!(!seen[1].is_working);
        assert_eq!(seen[1].config.last_query, Some(QueryType::Nearest));
    }

    #[test]
    fn failed_resolution_still_clears_working_for_observers() {
        let (service, _) = service();
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        service.subscribe(recorder.clone());

        assert!(service.resolve(Query::new(QueryType::Set).with_arg0("Nowhere")).is_none());

        let seen = recorder.0.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(!seen[1].is_working);
    }

    #[test]
    fn service_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NavigationService>();

        let (service, _) = service();
        let service = Arc::new(service);
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        service.subscribe(recorder.clone());

        let workers: Vec<_> = [QueryType::Nearest, QueryType::Farthest]
            .into_iter()
            .map(|query_type| {
                let service = Arc::clone(&service);
                thread::spawn(move || service.resolve(Query::new(query_type)).map(|e| e.query_type))
            })
            .collect();
        let mut resolved: Vec<_> = workers
            .into_iter()
            .map(|worker| worker.join().unwrap().unwrap())
            .collect();
        resolved.sort();

        let seen = recorder.0.lock().unwrap();
        let working: Vec<_> = seen.iter().map(|s| s.is_working).collect();
        assert_eq!(working, [true, false, true, false]);
        let mut finished: Vec<_> = seen
            .iter()
            .filter(|s| !s.is_working)
            .map(|s| s.config.last_query.unwrap())
            .collect();
        finished.sort();
        assert_eq!(finished, resolved);
        assert_eq!(finished, [QueryType::Farthest, QueryType::Nearest]);
    }

    #[derive(Default)]
    struct ReadsBack {
        service: std::sync::OnceLock<std::sync::Weak<NavigationService>>,
        seen: Mutex<Vec<(bool, bool)>>,
    }

    impl NavigationObserver for ReadsBack {
        fn state_changed(&self, snapshot: &NavigationSnapshot) {
            let Some(service) = self.service.get().and_then(|weak| weak.upgrade()) else {
                return;
            };
            let working = service.snapshot().is_working;
            assert_eq!(working, snapshot.is_working);
            let nested = service.resolve(Query::new(QueryType::Farthest)).is_some();
            self.seen.lock().unwrap().push((working, nested));
        }
    }

    #[test]
    fn observers_may_read_state_but_not_resolve() {
        let (service, _) = service();
        let service = Arc::new(service);
        let observer = Arc::new(ReadsBack::default());
        observer.service.set(Arc::downgrade(&service)).unwrap();
        service.subscribe(observer.clone());

        let event = service.resolve(Query::new(QueryType::Nearest)).unwrap();
        assert_eq!(event.query_type, QueryType::Nearest);
        assert_eq!(*observer.seen.lock().unwrap(), [(true, false), (false, false)]);
        assert_eq!(service.config().last_query, Some(QueryType::Nearest));

        assert!(service.resolve(Query::new(QueryType::Farthest)).is_some());
    }
}
