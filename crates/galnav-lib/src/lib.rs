//! Galnav library entry points.
//!
//! This crate answers navigation queries for a commander travelling the
//! galaxy: nearest or farthest mission systems, multi-stop mission circuits,
//! fuel scoop stars, station services, neutron and carrier plots. Higher-level
//! consumers (the CLI, an overlay) should go through [`NavigationService`]
//! instead of calling resolvers directly.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use galnav_lib::{load_catalog, JsonConfigStore, NavigationService, Query, QueryType};
//!
//! let catalog = Arc::new(load_catalog("catalog.json".as_ref())?);
//! let state = Arc::new(snapshot);
//! let store = Arc::new(JsonConfigStore::at_default_location()?);
//! let service = NavigationService::new(catalog, state.clone(), state, store)?;
//! if let Some(event) = service.resolve(Query::new(QueryType::Route)) {
//!     println!("{} stops", event.count);
//! }
//! ```

#![deny(warnings)]

pub mod catalog;
pub mod config;
pub mod continuity;
pub mod error;
pub mod event;
pub mod geometry;
pub mod mission;
pub mod provider;
pub mod query;
pub mod registry;
pub mod resolvers;
pub mod route;
pub mod service;
pub mod waypoint;

pub use catalog::{load_catalog, CatalogSystem, StarCatalog};
pub use config::{default_config_path, ConfigStore, JsonConfigStore, MemoryConfigStore, NavigationConfig};
pub use continuity::should_replace;
pub use error::{Error, Result};
pub use event::RouteDetailsEvent;
pub use geometry::{distance, Coordinates, DistancePolicy, SystemPosition};
pub use mission::{Mission, MissionId, MissionStatus};
pub use provider::{
    FleetCarrier, LandingPadSize, MissionSource, PlotRequest, SearchCategory, SearchFilter,
    SearchMatch, Ship, StarSystemProvider, Station, StationService, TravellerSnapshot,
    TravellerState,
};
pub use query::{Query, QueryGroup, QueryType};
pub use registry::ResolverRegistry;
pub use resolvers::rnna::{
    nearest_neighbour_tour, repetitive_nearest_neighbour, DistanceMatrix, Tour, TourShape,
};
pub use resolvers::{QueryResolver, ResolveContext};
pub use route::RouteCollection;
pub use service::{NavigationObserver, NavigationService, NavigationSnapshot};
pub use waypoint::{MarketId, SystemAddress, Waypoint};
